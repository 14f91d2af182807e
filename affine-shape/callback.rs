use crate::types::AffineShapeEvent;

/// Receiver of converged shape events.
///
/// Invoked exactly once per converged candidate, before any normalization
/// happens. Panics raised by the receiver propagate to the caller.
pub trait ShapeCallback {
    fn on_affine_shape_found(&mut self, event: &AffineShapeEvent<'_>);
}

impl<F> ShapeCallback for F
where
    F: FnMut(&AffineShapeEvent<'_>),
{
    fn on_affine_shape_found(&mut self, event: &AffineShapeEvent<'_>) {
        self(event)
    }
}

/// Callback that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallback;

impl ShapeCallback for NoopCallback {
    fn on_affine_shape_found(&mut self, _event: &AffineShapeEvent<'_>) {}
}

/// Two callbacks run in order on the same event
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A: ShapeCallback, B: ShapeCallback> ShapeCallback for Chain<A, B> {
    fn on_affine_shape_found(&mut self, event: &AffineShapeEvent<'_>) {
        self.first.on_affine_shape_found(event);
        self.second.on_affine_shape_found(event);
    }
}

pub trait ShapeCallbackExt: ShapeCallback + Sized {
    /// Forward every event to `self`, then to `next`
    fn and_then<B: ShapeCallback>(self, next: B) -> Chain<Self, B> {
        Chain { first: self, second: next }
    }
}

impl<C: ShapeCallback> ShapeCallbackExt for C {}
