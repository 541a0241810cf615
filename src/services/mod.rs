//! Business logic services

pub mod cart;
pub mod distributor;
pub mod ils;
pub mod selections;
pub mod sheets;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

use ils::IlsService;
use sheets::SheetService;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub cart: cart::CartService,
    pub selections: selections::SelectionService,
    pub distributor: distributor::DistributionService,
}

impl Services {
    /// Create all services with the given repository and adapters
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        sheets: Arc<dyn SheetService>,
        ils: Arc<dyn IlsService>,
    ) -> Self {
        Self {
            cart: cart::CartService::new(
                repository.clone(),
                sheets.clone(),
                config.sheets.folder_id.clone(),
            ),
            selections: selections::SelectionService::new(repository.clone(), sheets),
            distributor: distributor::DistributionService::new(
                repository,
                ils,
                config.ils.account_id,
            ),
        }
    }
}
