pub const fn wrap_decrement(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

pub const fn wrap_increment(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    (index + 1) % len
}

/// Moves an optional selection through `len` items; `None` enters at the
/// first (forwards) or last (backwards) item.
pub const fn step_selection(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (current, forward) {
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(index), true) => Some(wrap_increment(index, len)),
        (Some(index), false) => Some(wrap_decrement(index, len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_stays_in_range() {
        assert_eq!(wrap_increment(2, 3), 0);
        assert_eq!(wrap_decrement(0, 3), 2);
        assert_eq!(wrap_increment(0, 0), 0);
    }

    #[test]
    fn selection_enters_from_either_end() {
        assert_eq!(step_selection(None, 4, true), Some(0));
        assert_eq!(step_selection(None, 4, false), Some(3));
        assert_eq!(step_selection(Some(3), 4, true), Some(0));
        assert_eq!(step_selection(Some(1), 0, true), None);
    }
}
