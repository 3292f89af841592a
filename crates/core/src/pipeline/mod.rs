pub mod enroll_person_use_case;
pub mod identify_person_use_case;
pub mod loop_state;
pub mod pipeline_logger;
pub mod result_sink;
pub mod retry_policy;
