pub trait VecExtensions<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool;
}

impl<T> VecExtensions<T> for Vec<T> {
    fn remove_first_where<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.iter()
            .position(predicate)
            .map(|index| self.remove(index))
    }
}

pub trait SliceExtensions<T> {
    fn single_element(&self) -> Option<&T>;
}

impl<T> SliceExtensions<T> for [T] {
    fn single_element(&self) -> Option<&T> {
        match self.len() {
            1 => self.iter().next(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_first_where_should_take_only_the_first_match() {
        let mut cards = vec![1, 5, 3, 5];

        assert_eq!(cards.remove_first_where(|&c| c == 5), Some(5));
        assert_eq!(cards, vec![1, 3, 5]);
        assert_eq!(cards.remove_first_where(|&c| c == 9), None);
    }

    #[test]
    fn single_element_should_only_match_one() {
        assert_eq!([4].single_element(), Some(&4));
        assert_eq!([4, 2].single_element(), None);
        assert_eq!(Vec::<u8>::new().single_element(), None);
    }
}
