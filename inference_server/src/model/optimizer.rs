use ndarray::{Array, Dimension, Zip};

/// A trainable tensor together with its gradient and Adam moments.
#[derive(Debug, Clone)]
pub struct Param<D: Dimension> {
    pub value: Array<f64, D>,
    pub grad: Array<f64, D>,
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Param<D> {
    pub fn new(value: Array<f64, D>) -> Self {
        let zeros = Array::zeros(value.raw_dim());
        Self {
            grad: zeros.clone(),
            m: zeros.clone(),
            v: zeros,
            value,
        }
    }

    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }
}

pub trait Trainable {
    fn zero_grad(&mut self);
    fn step(&mut self, optimizer: &Adam);
}

/// Adam with bias correction folded into the step size.
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    iterations: i32,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            iterations: 0,
        }
    }

    /// Advance the iteration counter; call once per batch before `update`.
    pub fn next_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn iterations(&self) -> i32 {
        self.iterations
    }

    pub fn update<D: Dimension>(&self, param: &mut Param<D>) {
        let t = self.iterations.max(1);
        let lr_t = self.learning_rate * (1.0 - self.beta2.powi(t)).sqrt()
            / (1.0 - self.beta1.powi(t));
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        Zip::from(&mut param.value)
            .and(&param.grad)
            .and(&mut param.m)
            .and(&mut param.v)
            .for_each(|w, &g, m, v| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *w -= lr_t * *m / (v.sqrt() + epsilon);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut param = Param::new(array![1.0, -2.0, 0.5]);
        param.grad = array![0.3, -4.0, 0.0];

        let mut adam = Adam::new(0.01);
        adam.next_iteration();
        adam.update(&mut param);

        // First bias-corrected step is lr * sign(g).
        assert!((param.value[0] - 0.99).abs() < 1e-6);
        assert!((param.value[1] + 1.99).abs() < 1e-6);
        assert_eq!(param.value[2], 0.5);
    }

    #[test]
    fn test_minimises_quadratic() {
        let mut param = Param::new(Array1::from_elem(2, 3.0));
        let mut adam = Adam::new(0.1);

        for _ in 0..500 {
            param.zero_grad();
            param.grad = param.value.mapv(|w| 2.0 * w);
            adam.next_iteration();
            adam.update(&mut param);
        }

        assert!(param.value.iter().all(|w| w.abs() < 0.1));
        assert_eq!(adam.iterations(), 500);
    }
}
