/// The element-wise non-linearities used by the glyph network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
}
use Activation::*;

impl Activation {
    pub fn f(&self, z: f32) -> f32 {
        match self {
            Relu => z.max(0.),
            Sigmoid => 1. / (1. + (-z).exp()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clips_negatives() {
        assert_eq!(Relu.f(-3.), 0.);
        assert_eq!(Relu.f(0.), 0.);
        assert_eq!(Relu.f(2.5), 2.5);
    }

    #[test]
    fn sigmoid_is_bounded() {
        assert_eq!(Sigmoid.f(0.), 0.5);
        assert!(Sigmoid.f(10.) > 0.99 && Sigmoid.f(10.) < 1.);
        assert!(Sigmoid.f(-10.) > 0. && Sigmoid.f(-10.) < 0.01);
        assert_eq!(Sigmoid.f(-1000.), 0.);
    }
}
