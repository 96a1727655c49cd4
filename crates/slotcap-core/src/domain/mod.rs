mod request;
mod result;

pub use request::{
    BusinessUnit, CompatibilityRequest, DeliveryTimeWindow, OrderKey, RequestItem, ServiceRequest,
    TimeWindowSelector,
};
pub use result::{
    AvailableTimeWindow, CompatibleService, CompatibleServices, PaymentMethod, PaymentType,
    ProposalByService, ProposalWithAvailability, ServiceTimeWindowResult, TimeWindowProposal,
};
