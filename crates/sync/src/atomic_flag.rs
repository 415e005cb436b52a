use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, Ordering},
};

/// A cloneable flag, shared between the thread that raises it and the threads that poll it.
#[derive(Clone, Default, Debug)]
pub struct ArcAtomicBool(Arc<AtomicBool>);

impl ArcAtomicBool {
    #[must_use]
    pub fn new(val: bool) -> Self {
        ArcAtomicBool(Arc::new(AtomicBool::new(val)))
    }

    #[must_use]
    pub fn load(&self, order: Ordering) -> bool {
        self.0.load(order)
    }

    pub fn store(&self, val: bool, order: Ordering) {
        self.0.store(val, order);
    }

    #[must_use]
    pub fn weak(&self) -> Weak<AtomicBool> {
        Arc::downgrade(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let flag = ArcAtomicBool::new(false);
        let raised_elsewhere = flag.clone();
        raised_elsewhere.store(true, Ordering::SeqCst);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn weak_does_not_keep_the_flag_alive() {
        let flag = ArcAtomicBool::new(true);
        let weak = flag.weak();
        assert!(weak.upgrade().is_some());
        drop(flag);
        assert!(weak.upgrade().is_none());
    }
}
