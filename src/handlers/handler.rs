//! # Elementary handlers.
//!
//! A [`Handler`] is one non-decomposable subscription unit: either a free callable, or a
//! method bound to a target object held in an [`Arc`].
//!
//! Identity is `(target allocation, method)`:
//! - the **target** is compared by pointer (two `Arc`s to equal values are different targets);
//! - the **method** is a [`MethodId`], the type of the callable. Every `fn` item and every
//!   closure expression has its own type, so `Counter::on_change` and `Counter::on_reset` are
//!   different methods;
//! - a callable that carries state (a capturing closure) is additionally identified by its
//!   allocation: clones of one `Handler` are the same handler, two closures built by the same
//!   expression are not.
//!
//! A bound handler keeps its target alive only for as long as the `Handler` value itself
//! exists. Once subscribed, the event source keeps nothing but a weak reference.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use weak_event::{Handler, HandlerResult, Sender};
//!
//! struct Counter;
//!
//! impl Counter {
//!     fn on_change(&self, _sender: Sender<'_>, value: &u32) -> HandlerResult {
//!         println!("changed to {value}");
//!         Ok(())
//!     }
//! }
//!
//! let counter = Arc::new(Counter);
//! let a = Handler::bound(&counter, Counter::on_change);
//! let b = Handler::bound(&counter, Counter::on_change);
//! assert!(a.same_as(&b));
//!
//! let free = Handler::<u32>::free(|_sender, value| {
//!     println!("free {value}");
//!     Ok(())
//! });
//! assert!(!free.has_target());
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::chain::HandlerChain;

/// Optional source object passed to every handler of a raise.
pub type Sender<'a> = Option<&'a (dyn Any + Send + Sync)>;

/// Type-erased handler target.
pub(crate) type Target = Arc<dyn Any + Send + Sync>;

/// Callable for handlers without a target.
pub(crate) type FreeFn<A> = dyn Fn(Sender<'_>, &A) -> HandlerResult + Send + Sync;

/// Identity of a handler's callable.
///
/// Two ids are equal iff they were taken from the same callable type.
#[derive(Clone, Copy)]
pub struct MethodId {
    type_id: TypeId,
    name: &'static str,
}

impl MethodId {
    /// Returns the id of callable type `F`.
    pub fn of<F: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<F>(),
            name: type_name::<F>(),
        }
    }

    /// Returns the fully qualified type name of the callable.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MethodId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for MethodId {}

impl Hash for MethodId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Target-parameterized invocation thunk for bound handlers.
///
/// The target arrives type-erased; implementations recover the concrete type.
pub(crate) trait BoundInvoke<A>: Send + Sync {
    fn invoke(&self, target: &(dyn Any + Send + Sync), sender: Sender<'_>, args: &A)
    -> HandlerResult;
}

/// Method of `T` lifted to a [`BoundInvoke`].
struct BoundMethod<T, F> {
    method: F,
    _target: PhantomData<fn(&T)>,
}

impl<T, A, F> BoundInvoke<A> for BoundMethod<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&T, Sender<'_>, &A) -> HandlerResult + Send + Sync,
{
    fn invoke(
        &self,
        target: &(dyn Any + Send + Sync),
        sender: Sender<'_>,
        args: &A,
    ) -> HandlerResult {
        debug_assert!(target.is::<T>(), "bound handler target type mismatch");
        match target.downcast_ref::<T>() {
            Some(target) => (self.method)(target, sender, args),
            None => Err(HandlerError::fail(format_args!(
                "target is not a {}",
                type_name::<T>()
            ))),
        }
    }
}

/// Open (target-less) form of a handler's callable.
pub(crate) enum Invoker<A> {
    Free(Arc<FreeFn<A>>),
    Bound(Arc<dyn BoundInvoke<A>>),
}

impl<A> Invoker<A> {
    /// Calls the handler. A bound invoker needs its resolved target.
    pub(crate) fn call(
        &self,
        target: Option<&(dyn Any + Send + Sync)>,
        sender: Sender<'_>,
        args: &A,
    ) -> HandlerResult {
        match (self, target) {
            (Invoker::Free(f), _) => f(sender, args),
            (Invoker::Bound(b), Some(target)) => b.invoke(target, sender, args),
            (Invoker::Bound(_), None) => Err(HandlerError::fail("bound handler has no target")),
        }
    }
}

impl<A> Clone for Invoker<A> {
    fn clone(&self) -> Self {
        match self {
            Invoker::Free(f) => Invoker::Free(Arc::clone(f)),
            Invoker::Bound(b) => Invoker::Bound(Arc::clone(b)),
        }
    }
}

/// One elementary event handler: a free callable or a method bound to a target.
pub struct Handler<A> {
    pub(crate) target: Option<Target>,
    pub(crate) method: MethodId,
    pub(crate) instance: Option<usize>,
    pub(crate) invoker: Invoker<A>,
    pub(crate) owner: &'static str,
}

impl<A> Handler<A> {
    /// Creates a handler with no target. Free handlers are always alive once subscribed.
    pub fn free<F>(f: F) -> Self
    where
        F: Fn(Sender<'_>, &A) -> HandlerResult + Send + Sync + 'static,
    {
        let invoker: Arc<FreeFn<A>> = Arc::new(f);
        Self {
            target: None,
            method: MethodId::of::<F>(),
            instance: instance_of::<F, _>(&invoker),
            invoker: Invoker::Free(invoker),
            owner: owner_of::<F>(),
        }
    }

    /// Creates a handler that calls `method` on `target`.
    ///
    /// Only a weak reference to `target` is kept by an event source once subscribed.
    pub fn bound<T, F>(target: &Arc<T>, method: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, Sender<'_>, &A) -> HandlerResult + Send + Sync + 'static,
    {
        let erased: Target = target.clone();
        let invoker: Arc<dyn BoundInvoke<A>> = Arc::new(BoundMethod {
            method,
            _target: PhantomData::<fn(&T)>,
        });
        Self {
            target: Some(erased),
            method: MethodId::of::<F>(),
            instance: instance_of::<F, _>(&invoker),
            invoker: Invoker::Bound(invoker),
            owner: owner_of::<T>(),
        }
    }

    /// Returns the method identity of this handler.
    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Returns `true` if the handler is bound to a target.
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Returns the owner module name handed to the redirect hook.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Returns `true` if both handlers have the same target allocation and method, and, for
    /// stateful callables, come from the same handler.
    pub fn same_as(&self, other: &Handler<A>) -> bool {
        self.method == other.method
            && self.instance == other.instance
            && self.target_addr() == other.target_addr()
    }

    /// Chains `next` after this handler.
    pub fn then(self, next: Handler<A>) -> HandlerChain<A> {
        HandlerChain::from(self).then(next)
    }

    pub(crate) fn target_addr(&self) -> Option<usize> {
        self.target.as_ref().map(addr_of)
    }
}

impl<A> Clone for Handler<A> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            method: self.method,
            instance: self.instance,
            invoker: self.invoker.clone(),
            owner: self.owner,
        }
    }
}

impl<A> fmt::Debug for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("method", &self.method)
            .field("target", &self.target_addr())
            .field("instance", &self.instance)
            .field("owner", &self.owner)
            .finish()
    }
}

/// Address of the target allocation, stable while any `Arc` or `Weak` to it exists.
pub(crate) fn addr_of(target: &Target) -> usize {
    Arc::as_ptr(target) as *const () as usize
}

/// Address of the callable's allocation when `F` carries state, `None` for `fn` items and
/// non-capturing closures.
fn instance_of<F, T: ?Sized>(invoker: &Arc<T>) -> Option<usize> {
    (size_of::<F>() != 0).then(|| Arc::as_ptr(invoker).cast::<()>() as usize)
}

/// First path segment of `T`'s type name (the defining crate).
fn owner_of<T: ?Sized>() -> &'static str {
    let name = type_name::<T>();
    name.split_once("::").map_or(name, |(head, _)| head)
}
