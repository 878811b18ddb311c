#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation
)]

#[cfg(test)]
pub mod runner;
#[cfg(test)]
pub mod test_constants;
#[cfg(test)]
pub mod test_helpers;
#[cfg(test)]
pub mod tests;

#[cfg(test)]
mod test_runner {
    use crate::runner::context::test_context::TestContext;
    use crate::runner::orchestration_utils::setup_tracing_and_panic_handling;
    use crate::tests::test_admin::{
        test_admin_views, test_retention_cleanup, test_retention_update, test_tasks_runner,
    };
    use crate::tests::test_auth::{
        test_change_password, test_login, test_register, test_second_register_attempt,
        test_user_is_not_admin, test_wrong_password,
    };
    use crate::tests::test_notes::test_user_notes_and_download;
    use crate::tests::test_queue::{
        test_clear_completed, test_pause_and_resume, test_queue_listing,
        test_remove_job_cancels_task, test_retry_resets_task,
    };
    use crate::tests::test_root::test_health_endpoint;
    use crate::tests::test_upload::{
        test_anonymous_upload, test_delete_upload, test_rejected_upload_leaves_nothing,
        test_status_is_owner_only,
    };
    use crate::tests::test_webhook::{
        test_duplicate_success_is_ignored, test_error_webhook, test_success_webhook,
        test_webhook_validation,
    };
    use crate::tests::test_worker::{
        test_forwarding_failure_marks_task, test_forwarding_marks_task,
        test_missing_file_fails_task, test_processing_makes_file_ready,
        test_stalled_last_attempt_fails_task,
    };
    use crate::execute_suite;
    use color_eyre::Result;

    /// Needs a Postgres server at `secrets.database_url` of `assets/settings.yaml`
    /// (or `APP__SECRETS__DATABASE_URL`). Run with `cargo test -p test_integration -- --ignored`.
    #[tokio::test]
    #[ignore = "needs a Postgres server"]
    async fn integration_suite() -> Result<()> {
        setup_tracing_and_panic_handling();
        let context = TestContext::new().await?;

        execute_suite!(
            &context,
            [
                // -- Root --
                test_health_endpoint,
                // -- Auth --
                test_register,
                test_second_register_attempt,
                test_login,
                test_wrong_password,
                test_user_is_not_admin,
                test_change_password,
                // -- Upload --
                test_anonymous_upload,
                test_rejected_upload_leaves_nothing,
                test_status_is_owner_only,
                test_delete_upload,
                // -- Worker --
                test_processing_makes_file_ready,
                test_missing_file_fails_task,
                test_stalled_last_attempt_fails_task,
                test_forwarding_marks_task,
                test_forwarding_failure_marks_task,
                // -- Webhook --
                test_webhook_validation,
                test_success_webhook,
                test_duplicate_success_is_ignored,
                test_error_webhook,
                // -- Notes --
                test_user_notes_and_download,
                // -- Queue --
                test_retry_resets_task,
                test_remove_job_cancels_task,
                test_pause_and_resume,
                test_queue_listing,
                test_clear_completed,
                // -- Admin --
                test_retention_update,
                test_retention_cleanup,
                test_admin_views,
                test_tasks_runner,
            ]
        );

        context.teardown().await
    }
}
