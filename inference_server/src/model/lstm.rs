use super::layers::glorot_uniform;
use super::optimizer::{Adam, Param, Trainable};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Ix1, Ix2, s};
use rand::Rng;

/// LSTM layer with the four gates (input, forget, candidate, output) fused
/// into single `[4H, *]` matrices.
#[derive(Debug, Clone)]
pub struct Lstm {
    input_size: usize,
    hidden_size: usize,
    pub(crate) kernel: Param<Ix2>,
    pub(crate) recurrent: Param<Ix2>,
    pub(crate) bias: Param<Ix1>,
}

/// Activations kept from one timestep for backpropagation.
#[derive(Debug, Clone)]
struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    tanh_c: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct LstmTrace {
    steps: Vec<StepCache>,
}

impl LstmTrace {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Lstm {
    pub fn new<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let gates = 4 * hidden_size;

        let mut bias = Array1::zeros(gates);
        // Forget gate starts open.
        bias.slice_mut(s![hidden_size..2 * hidden_size]).fill(1.0);

        Self {
            input_size,
            hidden_size,
            kernel: Param::new(glorot_uniform((gates, input_size), rng)),
            recurrent: Param::new(glorot_uniform((gates, hidden_size), rng)),
            bias: Param::new(bias),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Runs the layer over `inputs` (`[T, input_size]`) from a zero state.
    ///
    /// Returns the hidden state of every timestep (`[T, hidden_size]`).
    pub fn forward(&self, inputs: ArrayView2<f64>) -> (Array2<f64>, LstmTrace) {
        let h = self.hidden_size;
        let timesteps = inputs.nrows();

        let mut hidden = Array2::zeros((timesteps, h));
        let mut h_prev = Array1::zeros(h);
        let mut c_prev = Array1::zeros(h);
        let mut steps = Vec::with_capacity(timesteps);

        for (t, x) in inputs.outer_iter().enumerate() {
            let z = self.kernel.value.dot(&x) + self.recurrent.value.dot(&h_prev) + &self.bias.value;

            let i = sigmoid(z.slice(s![0..h]));
            let f = sigmoid(z.slice(s![h..2 * h]));
            let g = z.slice(s![2 * h..3 * h]).mapv(f64::tanh);
            let o = sigmoid(z.slice(s![3 * h..4 * h]));

            let c = &f * &c_prev + &i * &g;
            let tanh_c = c.mapv(f64::tanh);
            let h_next = &o * &tanh_c;

            hidden.row_mut(t).assign(&h_next);
            steps.push(StepCache {
                x: x.to_owned(),
                h_prev,
                c_prev,
                i,
                f,
                g,
                o,
                tanh_c,
            });

            h_prev = h_next;
            c_prev = c;
        }

        (hidden, LstmTrace { steps })
    }

    /// Backpropagation through time.
    ///
    /// `d_hidden` is `dL/dh_t` for every timestep (zero rows where the output
    /// was not used). Gradients are added to the parameters' accumulators;
    /// the return value is `dL/dx_t` (`[T, input_size]`).
    pub fn backward(&mut self, trace: &LstmTrace, d_hidden: ArrayView2<f64>) -> Array2<f64> {
        let h = self.hidden_size;
        let timesteps = trace.steps.len();

        let mut d_inputs = Array2::zeros((timesteps, self.input_size));
        let mut dh_next = Array1::zeros(h);
        let mut dc_next = Array1::zeros(h);
        let mut d_gates = Array1::zeros(4 * h);

        for t in (0..timesteps).rev() {
            let step = &trace.steps[t];

            let dh = &d_hidden.row(t) + &dh_next;
            let d_o = &dh * &step.tanh_c;
            let dc = &dh * &step.o * &step.tanh_c.mapv(|v| 1.0 - v * v) + &dc_next;

            let d_i = &dc * &step.g;
            let d_f = &dc * &step.c_prev;
            let d_g = &dc * &step.i;
            dc_next = &dc * &step.f;

            d_gates
                .slice_mut(s![0..h])
                .assign(&(d_i * sigmoid_grad(step.i.view())));
            d_gates
                .slice_mut(s![h..2 * h])
                .assign(&(d_f * sigmoid_grad(step.f.view())));
            d_gates
                .slice_mut(s![2 * h..3 * h])
                .assign(&(d_g * step.g.mapv(|v| 1.0 - v * v)));
            d_gates
                .slice_mut(s![3 * h..4 * h])
                .assign(&(d_o * sigmoid_grad(step.o.view())));

            let column = d_gates.view().insert_axis(Axis(1));
            general_mat_mul(
                1.0,
                &column,
                &step.x.view().insert_axis(Axis(0)),
                1.0,
                &mut self.kernel.grad,
            );
            general_mat_mul(
                1.0,
                &column,
                &step.h_prev.view().insert_axis(Axis(0)),
                1.0,
                &mut self.recurrent.grad,
            );
            self.bias.grad += &d_gates;

            d_inputs
                .row_mut(t)
                .assign(&self.kernel.value.t().dot(&d_gates));
            dh_next = self.recurrent.value.t().dot(&d_gates);
        }

        d_inputs
    }
}

impl Trainable for Lstm {
    fn zero_grad(&mut self) {
        self.kernel.zero_grad();
        self.recurrent.zero_grad();
        self.bias.zero_grad();
    }

    fn step(&mut self, optimizer: &Adam) {
        optimizer.update(&mut self.kernel);
        optimizer.update(&mut self.recurrent);
        optimizer.update(&mut self.bias);
    }
}

fn sigmoid(x: ArrayView1<f64>) -> Array1<f64> {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

/// Derivative of the sigmoid expressed through its output.
fn sigmoid_grad(y: ArrayView1<f64>) -> Array1<f64> {
    y.mapv(|v| v * (1.0 - v))
}
