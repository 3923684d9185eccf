//! Numeric input shapes handed to predictors.

/// Ordered numeric sequence matching a model's trained feature order.
pub type FeatureVector = Vec<f64>;

/// Fixed square RGB image in height-width-channel order, intensities in [0, 1].
#[derive(Debug, Clone)]
pub struct ImageTensor {
    size: u32,
    data: Vec<f32>,
}

impl ImageTensor {
    /// Number of color channels; every served image model takes RGB input.
    pub const CHANNELS: usize = 3;

    /// Build a tensor from normalized pixel data.
    ///
    /// # Errors
    /// Returns error if `data` does not hold `size * size * 3` values.
    pub fn new(size: u32, data: Vec<f32>) -> Result<Self, String> {
        let expected = size as usize * size as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(format!(
                "Expected {} pixel values for a {size}x{size} RGB image, got {}",
                expected,
                data.len()
            ));
        }
        Ok(Self { size, data })
    }

    /// Square edge length in pixels.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Pixel data in height-width-channel order.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}
