use std::{
    any::Any,
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

thread_local! {
    static NEXT_OBJ_ID: Cell<u64> = const { Cell::new(1) };
}

/// Stable opaque identity of a replicated element.
///
/// Allocated from a monotonically increasing counter when the element's
/// [`ObjHandle`] is created, so identity survives any amount of moving,
/// cloning, or slot reassignment. Never derived from addresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(u64);

impl ObjId {
    fn next() -> Self {
        NEXT_OBJ_ID.with(|counter| {
            let id = counter.get();
            counter.set(id + 1);
            Self(id)
        })
    }
}

/// An element type that can live inside a replicated object sequence.
///
/// This is the seam toward the field-scanner and trigger subsystems: the
/// engine never looks inside an element itself, it only needs to mint
/// fresh default-initialized instances (to infer a constructor from the
/// first live element) and to hand the element to a child replicator.
pub trait Replicated: Any {
    /// Create a fresh, default-initialized instance of the same concrete
    /// type, wrapped in a new handle.
    fn fresh(&self) -> ObjHandle;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Explicit element constructor, supplied via `ReplicateMark` when a
/// collection may start out empty.
pub type ObjCtor = Rc<dyn Fn() -> ObjHandle>;

/// Cloneable handle to a live replicated element.
///
/// The shadow stores these instead of raw references: the element is
/// owned by the caller's collection, and the handle is re-resolved
/// against the live sequence on every delta cycle. Equality and hashing
/// go through the attached [`ObjId`], not through element values.
#[derive(Clone)]
pub struct ObjHandle {
    id: ObjId,
    obj: Rc<RefCell<dyn Replicated>>,
}

impl ObjHandle {
    pub fn new(obj: Rc<RefCell<dyn Replicated>>) -> Self {
        Self {
            id: ObjId::next(),
            obj,
        }
    }

    pub fn from_value<T: Replicated>(value: T) -> Self {
        Self::new(Rc::new(RefCell::new(value)))
    }

    pub fn id(&self) -> ObjId {
        self.id
    }

    /// Mint a fresh default-initialized element of the same concrete
    /// type as this one.
    pub fn fresh(&self) -> ObjHandle {
        self.obj.borrow().fresh()
    }

    pub fn borrow(&self) -> Ref<'_, dyn Replicated> {
        self.obj.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, dyn Replicated> {
        self.obj.borrow_mut()
    }

    /// Borrow the element downcast to its concrete type, if it is one.
    pub fn borrow_as<T: Replicated>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.obj.borrow(), |obj| obj.as_any().downcast_ref::<T>()).ok()
    }

    /// Mutably borrow the element downcast to its concrete type.
    pub fn borrow_mut_as<T: Replicated>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.obj.borrow_mut(), |obj| {
            obj.as_any_mut().downcast_mut::<T>()
        })
        .ok()
    }
}

impl PartialEq for ObjHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjHandle {}

impl Hash for ObjHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ObjHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjHandle").field(&self.id).finish()
    }
}
