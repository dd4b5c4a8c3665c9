use serde::Deserialize;
use utoipa::IntoParams;

pub(crate) const DEFAULT_BROADCAST_MESSAGE: &str = "Hello WebSocket!";
pub(crate) const DEFAULT_TEST_TASK_TITLE: &str = "Test Task";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct BroadcastParams {
    /// Text carried in the `message` field of the `SYSTEM_STATUS` frame.
    #[serde(default = "default_broadcast_message")]
    pub(crate) message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct TestTaskUpdateParams {
    #[serde(default = "default_test_task_title")]
    pub(crate) title: String,
}

fn default_broadcast_message() -> String {
    DEFAULT_BROADCAST_MESSAGE.to_string()
}

fn default_test_task_title() -> String {
    DEFAULT_TEST_TASK_TITLE.to_string()
}
