use chess::PieceColor;

/// One value per side of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BySide<T> {
    pub white: T,
    pub black: T,
}

impl<T> BySide<T> {
    pub fn new(white: T, black: T) -> Self {
        Self { white, black }
    }

    pub fn get(&self, side: PieceColor) -> &T {
        match side {
            PieceColor::White => &self.white,
            PieceColor::Black => &self.black,
        }
    }

    pub fn get_mut(&mut self, side: PieceColor) -> &mut T {
        match side {
            PieceColor::White => &mut self.white,
            PieceColor::Black => &mut self.black,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceColor, &T)> {
        [(PieceColor::White, &self.white), (PieceColor::Black, &self.black)].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_eq_bound<T: Eq>(_: &T) {}

    #[test]
    fn test_orientation_pair_is_comparable() {
        let mut orientation = BySide::new(PieceColor::White, PieceColor::Black);
        assert_eq_bound(&orientation);
        assert_eq!(orientation, BySide::new(PieceColor::White, PieceColor::Black));
        *orientation.get_mut(PieceColor::Black) = PieceColor::White;
        assert_ne!(orientation, BySide::new(PieceColor::White, PieceColor::Black));
        assert_eq!(*orientation.get(PieceColor::Black), PieceColor::White);
    }
}
