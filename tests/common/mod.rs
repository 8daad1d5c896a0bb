use autoinc::{Document, FieldOptions, Registry, TypeConfig};
use serde_json::Value;

/// Declarations for every fixture type used across the integration tests.
pub fn build_registry() -> Registry {
    let mut registry = Registry::new();

    let mut user = TypeConfig::new("User");
    user.declare("number", FieldOptions::new()).unwrap();
    let special_user = user.inherit("SpecialUser");

    let mut patient_file = TypeConfig::new("PatientFile");
    patient_file
        .declare("file_number", FieldOptions::new().scope("name"))
        .unwrap();

    // Scoped by the owning user's name.
    let mut operation = TypeConfig::new("Operation");
    operation
        .declare(
            "op_number",
            FieldOptions::new().scope_with(|r| {
                r.read_attribute("user")
                    .and_then(|user| user.get("name").cloned())
                    .unwrap_or(Value::Null)
            }),
        )
        .unwrap();

    let mut vehicle = TypeConfig::new("Vehicle");
    vehicle
        .declare("vin", FieldOptions::new().seed(1000))
        .unwrap();

    let mut ticket = TypeConfig::new("Ticket");
    ticket.declare("number", FieldOptions::new().step(2)).unwrap();

    let mut lottery_ticket = TypeConfig::new("LotteryTicket");
    lottery_ticket
        .declare(
            "number",
            FieldOptions::new().step_with(|r| {
                r.read_attribute("start")
                    .and_then(|start| start.as_i64())
                    .unwrap_or(0)
                    + 1
            }),
        )
        .unwrap();

    let mut intern = TypeConfig::new("Intern");
    intern.declare("number", FieldOptions::manual()).unwrap();

    for config in [
        user,
        special_user,
        patient_file,
        operation,
        vehicle,
        ticket,
        lottery_ticket,
        intern,
    ] {
        registry.register(config).unwrap();
    }
    registry
}
