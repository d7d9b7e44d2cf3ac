pub(crate) mod api_controller;
pub(crate) mod auth_status_controller;
pub(crate) mod health_check_controller;
pub(crate) mod profile_controller;
pub(crate) mod session_policy_controller;
pub(crate) mod system_controller;
pub(crate) mod user_session_controller;
