use super::optimizer::{Adam, Param, Trainable};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array2, ArrayView1, Axis, Ix1, Ix2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;

/// Glorot/Xavier uniform init for a `[fan_out, fan_in]` matrix.
pub(crate) fn glorot_uniform<R: Rng + ?Sized>(shape: (usize, usize), rng: &mut R) -> Array2<f64> {
    let (fan_out, fan_in) = shape;
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::random_using(shape, Uniform::new(-limit, limit), rng)
}

#[derive(Debug, Clone)]
pub struct Dense {
    pub(crate) weights: Param<Ix2>,
    pub(crate) bias: Param<Ix1>,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        Self {
            weights: Param::new(glorot_uniform((output_size, input_size), rng)),
            bias: Param::new(Array1::zeros(output_size)),
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.value.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.value.nrows()
    }

    pub fn forward(&self, x: ArrayView1<f64>) -> Array1<f64> {
        self.weights.value.dot(&x) + &self.bias.value
    }

    /// Accumulates parameter gradients for input `x` and returns `dL/dx`.
    pub fn backward(&mut self, x: ArrayView1<f64>, d_out: ArrayView1<f64>) -> Array1<f64> {
        general_mat_mul(
            1.0,
            &d_out.insert_axis(Axis(1)),
            &x.insert_axis(Axis(0)),
            1.0,
            &mut self.weights.grad,
        );
        self.bias.grad += &d_out;

        self.weights.value.t().dot(&d_out)
    }
}

impl Trainable for Dense {
    fn zero_grad(&mut self) {
        self.weights.zero_grad();
        self.bias.zero_grad();
    }

    fn step(&mut self, optimizer: &Adam) {
        optimizer.update(&mut self.weights);
        optimizer.update(&mut self.bias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_dense_shapes() {
        let mut rng = StdRng::seed_from_u64(1);
        let dense = Dense::new(50, 25, &mut rng);

        assert_eq!(dense.input_size(), 50);
        assert_eq!(dense.output_size(), 25);
        assert_eq!(dense.forward(Array1::zeros(50).view()), Array1::<f64>::zeros(25));
    }

    #[test]
    fn test_glorot_limit() {
        let mut rng = StdRng::seed_from_u64(2);
        let w = glorot_uniform((4, 2), &mut rng);
        let limit = 1.0;

        assert_eq!(w.shape(), &[4, 2]);
        assert!(w.iter().all(|v| v.abs() <= limit));
    }

    #[test]
    fn test_dense_backward() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut dense = Dense::new(2, 1, &mut rng);
        dense.weights.value = array![[2.0, -1.0]];
        dense.zero_grad();

        let x = array![0.5, 3.0];
        let dx = dense.backward(x.view(), array![1.5].view());

        assert_eq!(dense.weights.grad, array![[0.75, 4.5]]);
        assert_eq!(dense.bias.grad, array![1.5]);
        assert_eq!(dx, array![3.0, -1.5]);
    }
}
