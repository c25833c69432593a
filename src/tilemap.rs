/// A 2D grid that wraps on both axes (toroidal).
///
/// Physical storage is `width * height`; any signed world position maps to a
/// cell through `rem_euclid`, so the same cell stands for different world
/// positions as a window scrolls over it.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Physical cell for a signed position, wrapping both axes.
    pub fn wrap(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.rem_euclid(self.width as i64) as usize,
            y.rem_euclid(self.height as i64) as usize,
        )
    }

    /// Get the index into the data array, wrapping both axes.
    fn index(&self, x: usize, y: usize) -> usize {
        (y % self.height) * self.width + (x % self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn get_wrapped(&self, x: i64, y: i64) -> &T {
        let (x, y) = self.wrap(x, y);
        self.get(x, y)
    }

    pub fn set_wrapped(&mut self, x: i64, y: i64, value: T) {
        let (x, y) = self.wrap(x, y);
        self.set(x, y, value);
    }
}
