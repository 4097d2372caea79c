use super::layers::Dense;
use super::lstm::{Lstm, LstmTrace};
use super::optimizer::{Adam, Trainable};
use crate::error::ModelError;
use data_ingestion::config::ModelConfig;
use log::debug;
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use rand::Rng;
use rand::seq::SliceRandom;

const INPUT_FEATURES: usize = 1;

/// Two stacked LSTM layers followed by a two-layer linear head, trained with
/// mean squared error.
#[derive(Debug, Clone)]
pub struct LstmRegressor {
    encoder: Lstm,
    decoder: Lstm,
    hidden: Dense,
    output: Dense,
    epochs: usize,
    batch_size: usize,
    learning_rate: f64,
    shuffle: bool,
}

struct SampleTrace {
    encoder: LstmTrace,
    decoder: LstmTrace,
    last_hidden: Array1<f64>,
    dense_hidden: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub samples: usize,
    pub loss_history: Vec<f64>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

impl LstmRegressor {
    pub fn new<R: Rng + ?Sized>(config: &ModelConfig, rng: &mut R) -> Self {
        let hidden_units = config.hidden_units.max(1);
        let dense_units = config.dense_units.max(1);

        Self {
            encoder: Lstm::new(INPUT_FEATURES, hidden_units, rng),
            decoder: Lstm::new(hidden_units, hidden_units, rng),
            hidden: Dense::new(hidden_units, dense_units, rng),
            output: Dense::new(dense_units, 1, rng),
            epochs: config.epochs,
            batch_size: config.batch_size.max(1),
            learning_rate: config.learning_rate,
            shuffle: config.shuffle,
        }
    }

    /// Fits on windows `x` (`[samples, timesteps, 1]`) against targets `y`.
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        x: &Array3<f64>,
        y: &Array1<f64>,
        rng: &mut R,
    ) -> Result<TrainingReport, ModelError> {
        check_input(x)?;
        let samples = x.shape()[0];
        if y.len() != samples {
            return Err(ModelError::TargetMismatch {
                samples,
                targets: y.len(),
            });
        }

        let mut optimizer = Adam::new(self.learning_rate);
        let mut order: Vec<usize> = (0..samples).collect();
        let mut loss_history = Vec::with_capacity(self.epochs);

        for epoch in 1..=self.epochs {
            if self.shuffle {
                order.shuffle(rng);
            }

            let mut squared_error = 0.0;
            for batch in order.chunks(self.batch_size) {
                self.zero_grad();
                // d(mean((p - y)^2))/dp over the batch.
                let scale = 2.0 / batch.len() as f64;

                for &i in batch {
                    let (prediction, trace) = self.forward_sample(x.index_axis(Axis(0), i));
                    let err = prediction - y[i];
                    squared_error += err * err;
                    self.backward_sample(&trace, scale * err);
                }

                optimizer.next_iteration();
                self.step(&optimizer);
            }

            let loss = squared_error / samples as f64;
            if !loss.is_finite() {
                return Err(ModelError::Diverged { epoch });
            }
            debug!("epoch {}/{} - loss: {:.6}", epoch, self.epochs, loss);
            loss_history.push(loss);
        }

        Ok(TrainingReport {
            samples,
            loss_history,
        })
    }

    /// One prediction per window in `x` (`[samples, timesteps, 1]`).
    pub fn predict(&self, x: &Array3<f64>) -> Result<Array1<f64>, ModelError> {
        check_input(x)?;

        Ok(x
            .outer_iter()
            .map(|window| self.forward_sample(window).0)
            .collect())
    }

    fn forward_sample(&self, window: ArrayView2<f64>) -> (f64, SampleTrace) {
        let (encoded, encoder) = self.encoder.forward(window);
        let (decoded, decoder) = self.decoder.forward(encoded.view());

        let last_hidden = decoded.row(decoded.nrows() - 1).to_owned();
        let dense_hidden = self.hidden.forward(last_hidden.view());
        let prediction = self.output.forward(dense_hidden.view())[0];

        let trace = SampleTrace {
            encoder,
            decoder,
            last_hidden,
            dense_hidden,
        };
        (prediction, trace)
    }

    fn backward_sample(&mut self, trace: &SampleTrace, d_prediction: f64) {
        let d_dense_hidden = self.output.backward(
            trace.dense_hidden.view(),
            Array1::from_elem(1, d_prediction).view(),
        );
        let d_last = self
            .hidden
            .backward(trace.last_hidden.view(), d_dense_hidden.view());

        // Only the final decoder state feeds the head.
        let timesteps = trace.decoder.len();
        let mut d_decoded = Array2::zeros((timesteps, self.decoder.hidden_size()));
        d_decoded.row_mut(timesteps - 1).assign(&d_last);

        let d_encoded = self.decoder.backward(&trace.decoder, d_decoded.view());
        self.encoder.backward(&trace.encoder, d_encoded.view());
    }
}

impl Trainable for LstmRegressor {
    fn zero_grad(&mut self) {
        self.encoder.zero_grad();
        self.decoder.zero_grad();
        self.hidden.zero_grad();
        self.output.zero_grad();
    }

    fn step(&mut self, optimizer: &Adam) {
        self.encoder.step(optimizer);
        self.decoder.step(optimizer);
        self.hidden.step(optimizer);
        self.output.step(optimizer);
    }
}

fn check_input(x: &Array3<f64>) -> Result<(), ModelError> {
    let shape = x.shape();
    if shape[0] == 0 {
        return Err(ModelError::NoSamples);
    }
    if shape[1] == 0 {
        return Err(ModelError::EmptyWindow);
    }
    if shape[2] != INPUT_FEATURES {
        return Err(ModelError::FeatureMismatch {
            expected: INPUT_FEATURES,
            got: shape[2],
        });
    }
    Ok(())
}
