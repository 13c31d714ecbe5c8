//! Investment growth: deterministic projection and Monte Carlo paths

mod projector;
mod monte_carlo;
mod instruments;
pub mod loader;

pub use projector::{
    compound_year, project_deterministic, GrowthInputs, GrowthPoint, GrowthProjection,
    GrowthProjector, CONTRIBUTIONS_PER_YEAR,
};
pub use monte_carlo::{sample_return, MonteCarloInputs, MonteCarloSimulator, SimulationBundle};
pub use instruments::{resolve_volatility, Instrument, InstrumentCatalog};
