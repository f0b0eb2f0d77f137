use std::sync::Arc;
use std::time::Duration;

use crate::modules::trackers::core::ports::TrackerRepository;
use crate::modules::trackers::use_cases::create_tracker::handler::CreateTrackerHandler;
use crate::modules::trackers::use_cases::delete_tracker::handler::DeleteTrackerHandler;
use crate::modules::trackers::use_cases::get_tracker::handler::GetTrackerHandler;
use crate::modules::trackers::use_cases::list_trackers::handler::ListTrackersHandler;
use crate::modules::trackers::use_cases::update_tracker::handler::UpdateTrackerHandler;

#[derive(Clone)]
pub struct AppState {
    pub get_handler: Arc<GetTrackerHandler<dyn TrackerRepository>>,
    pub list_handler: Arc<ListTrackersHandler<dyn TrackerRepository>>,
    pub create_handler: Arc<CreateTrackerHandler<dyn TrackerRepository>>,
    pub update_handler: Arc<UpdateTrackerHandler<dyn TrackerRepository>>,
    pub delete_handler: Arc<DeleteTrackerHandler<dyn TrackerRepository>>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Wires every handler onto the same repository.
    pub fn new(repository: Arc<dyn TrackerRepository>, request_timeout: Duration) -> Self {
        Self {
            get_handler: Arc::new(GetTrackerHandler::new(repository.clone())),
            list_handler: Arc::new(ListTrackersHandler::new(repository.clone())),
            create_handler: Arc::new(CreateTrackerHandler::new(repository.clone())),
            update_handler: Arc::new(UpdateTrackerHandler::new(repository.clone())),
            delete_handler: Arc::new(DeleteTrackerHandler::new(repository)),
            request_timeout,
        }
    }
}
