use mcp_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("duplicate hospital id in catalog: {0}")]
    DuplicateHospital(u32),

    #[error("hospital not found: {0}")]
    HospitalNotFound(u32),

    #[error("unknown blood group: '{0}'. Expected one of A+, A-, B+, B-, AB+, AB-, O+, O-")]
    InvalidBloodGroup(String),

    #[error("unknown urgency level: '{0}'. Expected one of Low, Medium, High, Critical")]
    InvalidUrgency(String),
}
