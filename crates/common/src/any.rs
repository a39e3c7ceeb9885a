use std::any::Any;

/// Upcast to [`Any`] through a trait object's vtable.
///
/// Blanket-implemented for every `'static` type, so a trait that lists
/// `AsAny` as a supertrait can be downcast from `&dyn Trait`. Call it on the
/// trait object itself (`boxed.as_ref().as_any()`), not on the `Box`, or the
/// box type is what gets reported.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
