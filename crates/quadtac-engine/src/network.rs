use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use thiserror::Error;

/// Range of the initial random weights.
const INIT_WEIGHT: f64 = 1.0;
/// Half-width of the per-weight mutation noise before scaling.
const MUTATION_NOISE: f64 = 0.1;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("network needs at least one layer")]
    NoLayers,
    #[error("architecture {0:?} needs an input size and at least one layer, all non-zero")]
    Architecture(Vec<usize>),
    #[error("layer {layer} has no neurons")]
    EmptyLayer { layer: usize },
    #[error("layer {layer} neuron {neuron} has {found} weights, expected {expected}")]
    WeightCount {
        layer: usize,
        neuron: usize,
        expected: usize,
        found: usize,
    },
    #[error("input has {found} values, network expects {expected}")]
    InputLength { expected: usize, found: usize },
}

/// One fully connected layer. `neurons[n][0]` is the bias of neuron `n`,
/// applied to an implicit leading input of 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    neurons: Vec<Vec<f64>>,
}

impl Layer {
    pub fn new(neurons: Vec<Vec<f64>>) -> Self {
        Self { neurons }
    }

    pub fn neurons(&self) -> &[Vec<f64>] {
        &self.neurons
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.neurons
            .iter()
            .map(|weights| {
                let sum = weights[0]
                    + weights[1..]
                        .iter()
                        .zip(input)
                        .map(|(w, x)| w * x)
                        .sum::<f64>();
                sum.tanh()
            })
            .collect()
    }
}

/// Small feed-forward network with `tanh` activations.
///
/// Never changes after construction; [`Network::mutated`] returns a perturbed
/// copy instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Checks that every neuron of a layer has one weight per output of the
    /// previous layer plus the bias.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, NetworkError> {
        let first = layers.first().ok_or(NetworkError::NoLayers)?;
        let first_neuron = first
            .neurons
            .first()
            .ok_or(NetworkError::EmptyLayer { layer: 0 })?;
        if first_neuron.is_empty() {
            return Err(NetworkError::WeightCount {
                layer: 0,
                neuron: 0,
                expected: 1,
                found: 0,
            });
        }

        let mut expected = first_neuron.len();
        for (layer_idx, layer) in layers.iter().enumerate() {
            if layer.is_empty() {
                return Err(NetworkError::EmptyLayer { layer: layer_idx });
            }
            for (neuron_idx, weights) in layer.neurons.iter().enumerate() {
                if weights.len() != expected {
                    return Err(NetworkError::WeightCount {
                        layer: layer_idx,
                        neuron: neuron_idx,
                        expected,
                        found: weights.len(),
                    });
                }
            }
            expected = layer.len() + 1;
        }

        Ok(Self { layers })
    }

    /// `architecture[0]` is the input size, the rest are layer widths.
    pub fn random<R: Rng + ?Sized>(
        architecture: &[usize],
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        if architecture.len() < 2 || architecture.contains(&0) {
            return Err(NetworkError::Architecture(architecture.to_vec()));
        }
        let dist = Uniform::new_inclusive(-INIT_WEIGHT, INIT_WEIGHT);
        let layers = architecture
            .windows(2)
            .map(|pair| {
                let (inputs, outputs) = (pair[0], pair[1]);
                Layer::new(
                    (0..outputs)
                        .map(|_| (0..=inputs).map(|_| dist.sample(rng)).collect())
                        .collect(),
                )
            })
            .collect();
        Self::from_layers(layers)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_len(&self) -> usize {
        self.layers[0].neurons[0].len() - 1
    }

    pub fn output_len(&self) -> usize {
        self.layers.last().map_or(0, Layer::len)
    }

    pub fn architecture(&self) -> Vec<usize> {
        std::iter::once(self.input_len())
            .chain(self.layers.iter().map(Layer::len))
            .collect()
    }

    pub fn weight_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| layer.neurons.iter())
            .map(Vec::len)
            .sum()
    }

    pub fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if input.len() != self.input_len() {
            return Err(NetworkError::InputLength {
                expected: self.input_len(),
                found: input.len(),
            });
        }
        Ok(self.forward(input))
    }

    /// Caller guarantees `input.len() == self.input_len()`.
    pub(crate) fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut activations = input.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        activations
    }

    /// Copy with every weight shifted by `learning_rate * uniform(-0.1, 0.1)`.
    pub fn mutated<R: Rng + ?Sized>(&self, learning_rate: f64, rng: &mut R) -> Self {
        let noise = Uniform::new_inclusive(-MUTATION_NOISE, MUTATION_NOISE);
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                Layer::new(
                    layer
                        .neurons
                        .iter()
                        .map(|weights| {
                            weights
                                .iter()
                                .map(|w| w + learning_rate * noise.sample(rng))
                                .collect()
                        })
                        .collect(),
                )
            })
            .collect();
        Self { layers }
    }
}
