use std::cell::Cell;
use std::rc::Rc;

/// Small shared value written by input handlers and read by render hooks.
///
/// Consistency is relaxed: writers overwrite (last write wins) and
/// readers observe whatever value is current when they look, with no notion of
/// a per-frame snapshot. A hook reading two cells may see one updated and the
/// other not. Both sides live on the event-loop thread, so no locking exists.
#[derive(Debug, Clone, Default)]
pub struct InputCell<T: Copy> {
    value: Rc<Cell<T>>,
}

impl<T: Copy> InputCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(Cell::new(value)),
        }
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn set(&self, value: T) {
        self.value.set(value);
    }

    /// Read-modify-write; not atomic with respect to other handles.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        self.value.set(f(self.value.get()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let writer = InputCell::new([0.0_f32; 2]);
        let reader = writer.clone();

        writer.set([3.0, 4.0]);
        assert_eq!(reader.get(), [3.0, 4.0]);

        reader.update(|[x, y]| [x + 1.0, y]);
        assert_eq!(writer.get(), [4.0, 4.0]);
    }
}
