use automata_kernel::service::ServiceMarker;

#[automata_derive::service]
pub struct ReportingService;

fn main() {
    assert_eq!(<ReportingService as ServiceMarker>::SERVICE_NAME, "reporting_service");
}
