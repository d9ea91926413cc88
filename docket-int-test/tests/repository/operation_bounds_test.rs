use docket::errors::{DocketResult, ErrorKind};
use docket::repository::Repository;
use docket::store::memory::InMemoryModule;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::repository::{generate_employee, Employee};
use docket_int_test::test_util::{create_test_context, random_database, Backend};

#[tokio::test(start_paused = true)]
async fn test_slow_round_trip_times_out() -> DocketResult<()> {
    let ctx = create_test_context(Backend::Memory).await?;
    let (repo, recording) = ctx
        .recorded_repository::<Employee>(Some(Duration::from_secs(10)))
        .await?;
    let bounded = repo.with_timeout(Duration::from_millis(200));
    assert_eq!(bounded.operation_timeout(), Some(Duration::from_millis(200)));

    let err = bounded.count().await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Timeout);

    let err = bounded.add(generate_employee(1)).await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Timeout);
    assert_eq!(recording.round_trips(), 2);

    // the unbounded repository waits the delay out
    assert_eq!(repo.operation_timeout(), None);
    assert_eq!(repo.count().await?, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_timeout_applies_to_query_enumeration() -> DocketResult<()> {
    let ctx = create_test_context(Backend::Memory).await?;
    let (repo, _recording) = ctx
        .recorded_repository::<Employee>(Some(Duration::from_secs(10)))
        .await?;

    let err = repo
        .with_timeout(Duration::from_secs(1))
        .query()
        .to_vec()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Timeout);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_token_fails_without_round_trip() -> DocketResult<()> {
    let ctx = create_test_context(Backend::Memory).await?;
    let (repo, recording) = ctx.recorded_repository::<Employee>(None).await?;

    let token = CancellationToken::new();
    token.cancel();
    let cancelled = repo.with_cancellation(token);

    assert_eq!(cancelled.count().await.unwrap_err().kind(), &ErrorKind::Cancelled);
    assert_eq!(
        cancelled.add(generate_employee(1)).await.unwrap_err().kind(),
        &ErrorKind::Cancelled
    );
    assert_eq!(cancelled.get_by_id(&1).await.unwrap_err().kind(), &ErrorKind::Cancelled);
    assert_eq!(cancelled.delete_all().await.unwrap_err().kind(), &ErrorKind::Cancelled);
    assert_eq!(recording.round_trips(), 0);

    // the original repository is unaffected
    assert_eq!(repo.count().await?, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_operation_is_running() -> DocketResult<()> {
    let ctx = create_test_context(Backend::Memory).await?;
    let (repo, recording) = ctx
        .recorded_repository::<Employee>(Some(Duration::from_secs(30)))
        .await?;

    let token = CancellationToken::new();
    let cancelled = repo.with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });
    let err = cancelled.add(generate_employee(1)).await.unwrap_err();
    canceller.await.expect("canceller task panicked");

    assert_eq!(err.kind(), &ErrorKind::Cancelled);
    assert_eq!(recording.round_trips(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_builder_applies_operation_bounds() -> DocketResult<()> {
    let module = InMemoryModule::new();
    let connection_string = format!("memory://localhost/{}", random_database());
    let token = CancellationToken::new();

    let repo: Repository<Employee> = Repository::builder()
        .connection_string(&connection_string)
        .operation_timeout(Duration::from_secs(2))
        .cancellation(token.clone())
        .open(&module)
        .await?;
    assert_eq!(repo.operation_timeout(), Some(Duration::from_secs(2)));

    repo.add(generate_employee(1)).await?;
    assert_eq!(repo.count().await?, 1);

    token.cancel();
    assert_eq!(repo.count().await.unwrap_err().kind(), &ErrorKind::Cancelled);
    Ok(())
}

#[tokio::test]
async fn test_zero_timeout_is_rejected() {
    let module = InMemoryModule::new();
    let err = Repository::<Employee>::builder()
        .connection_string("memory://localhost/bounds")
        .operation_timeout(Duration::ZERO)
        .open(&module)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    assert_eq!(module.database_count(), 0);
}
