/// Holds exactly one instance of a type that the scene cannot run without
/// (player, map handler).
///
/// Installing twice or reading before install are logic errors and panic in
/// every build profile: rendering order depends on these being present.
#[derive(Debug)]
pub struct SingletonSlot<T> {
    label: &'static str,
    value: Option<T>,
}

impl<T> SingletonSlot<T> {
    pub const fn new(label: &'static str) -> Self {
        Self { label, value: None }
    }

    /// # Panics
    /// Panics if the slot already holds an instance.
    pub fn install(&mut self, value: T) -> &mut T {
        if self.value.is_some() {
            panic!("{} singleton instantiated twice", self.label);
        }
        self.value.insert(value)
    }

    /// # Panics
    /// Panics if nothing has been installed.
    pub fn get(&self) -> &T {
        match self.value.as_ref() {
            Some(value) => value,
            None => panic!("{} singleton accessed before instantiation", self.label),
        }
    }

    /// # Panics
    /// Panics if nothing has been installed.
    pub fn get_mut(&mut self) -> &mut T {
        match self.value.as_mut() {
            Some(value) => value,
            None => panic!("{} singleton accessed before instantiation", self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_then_get_round_trips() {
        let mut slot = SingletonSlot::new("map");
        slot.install(7_u32);
        *slot.get_mut() += 1;
        assert_eq!(*slot.get(), 8);
    }

    #[test]
    #[should_panic(expected = "player singleton instantiated twice")]
    fn second_install_panics() {
        let mut slot = SingletonSlot::new("player");
        slot.install(1_u32);
        slot.install(2_u32);
    }

    #[test]
    #[should_panic(expected = "map singleton accessed before instantiation")]
    fn get_before_install_panics() {
        let slot = SingletonSlot::<u32>::new("map");
        let _ = slot.get();
    }
}
