use manifest_sync_core::contract::TaskExecutionResponse;

pub trait TransferTaskStarter {
    /// Starts one execution of `task_arn` restricted to `include_pattern`.
    fn start_task_execution(
        &self,
        task_arn: &str,
        include_pattern: &str,
    ) -> Result<TaskExecutionResponse, String>;
}
