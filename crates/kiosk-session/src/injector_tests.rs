use super::*;
use crate::testing::FakeWindow;
use kiosk_config::FieldConfig;

fn matti() -> SessionRequest {
    SessionRequest::new("https://kiosk.example/")
        .with_field("firstName", "Matti")
        .with_field("lastName", "Meikäläinen")
        .with_field("email", "matti.testi@example.com")
        .with_field("dateOfBirth", "1980-01-01")
}

#[test]
fn test_poll_schedule_is_bounded() {
    let mut schedule = PollSchedule::new(Duration::from_millis(500), 3);
    assert!(!schedule.gave_up());
    assert_eq!(schedule.by_ref().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(schedule.gave_up());
    assert_eq!(schedule.next(), None);
    assert_eq!(schedule.attempts(), 3);
}

#[test]
fn test_poll_schedule_defaults() {
    let schedule = PollSchedule::from_config(&InjectionConfig::default());
    assert_eq!(schedule.interval(), Duration::from_millis(500));
    assert_eq!(schedule.count(), 40);
}

#[test]
fn test_zero_budget_gives_up_immediately() {
    let mut schedule = PollSchedule::new(Duration::from_millis(500), 0);
    assert!(schedule.gave_up());
    assert_eq!(schedule.next(), None);
}

#[tokio::test(start_paused = true)]
async fn test_injects_once_fields_render() {
    let window = Arc::new(FakeWindow::new().ready_after(2));
    let injector = FieldInjector::new(window.clone(), &InjectionConfig::default(), &matti());

    let start = tokio::time::Instant::now();
    let outcome = injector.run(CancellationToken::new()).await;

    match outcome {
        InjectionOutcome::Injected { attempt, report } => {
            assert_eq!(attempt, 2);
            assert_eq!(report.filled.len(), 4);
            assert_eq!(report.events, 12);
            assert!(report.checkbox);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(start.elapsed(), Duration::from_millis(1000));

    let page = window.page.lock();
    assert_eq!(page.values["firstName"], "Matti");
    assert_eq!(page.values["lastName"], "Meikäläinen");
    assert_eq!(page.values["dateOfBirth"], "1980-01-01");
    assert_eq!(page.readonly_removed, vec!["dateOfBirth".to_string()]);
    assert_eq!(page.checkbox_clicks, 1);
    for key in ["firstName", "lastName", "email", "dateOfBirth"] {
        for kind in ["input", "change", "blur"] {
            assert_eq!(page.events[&(key.to_string(), kind.to_string())], 1);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_second_run_does_not_reinject() {
    let window = Arc::new(FakeWindow::new());
    let injector = FieldInjector::new(window.clone(), &InjectionConfig::default(), &matti());

    assert!(matches!(
        injector.run(CancellationToken::new()).await,
        InjectionOutcome::Injected { .. }
    ));
    assert_eq!(
        injector.run(CancellationToken::new()).await,
        InjectionOutcome::AlreadyInjected
    );
    assert_eq!(window.fills.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_only_non_empty_values_are_written() {
    let window = Arc::new(FakeWindow::new().with_checked_box());
    let request = SessionRequest::new("https://kiosk.example/")
        .with_field("firstName", "Matti")
        .with_field("lastName", "");
    let injector = FieldInjector::new(window.clone(), &InjectionConfig::default(), &request);

    let outcome = injector.run(CancellationToken::new()).await;
    let InjectionOutcome::Injected { report, .. } = outcome else {
        panic!("expected injection");
    };
    assert_eq!(report.filled, vec!["firstName".to_string()]);
    assert!(!report.checkbox);

    let page = window.page.lock();
    assert_eq!(page.values.len(), 1);
    assert_eq!(page.checkbox_clicks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_budget() {
    let window = Arc::new(FakeWindow::new().never_ready());
    let config = InjectionConfig {
        max_attempts: 5,
        ..Default::default()
    };
    let injector = FieldInjector::new(window.clone(), &config, &matti());

    let start = tokio::time::Instant::now();
    let outcome = injector.run(CancellationToken::new()).await;

    assert_eq!(outcome, InjectionOutcome::GaveUp { attempts: 5 });
    assert_eq!(start.elapsed(), Duration::from_millis(2500));
    assert_eq!(window.probes.load(Ordering::SeqCst), 5);
    assert_eq!(window.fills.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_polling() {
    let window = Arc::new(FakeWindow::new().never_ready());
    let injector = Arc::new(FieldInjector::new(
        window.clone(),
        &InjectionConfig::default(),
        &matti(),
    ));
    let cancel = CancellationToken::new();

    let task = {
        let injector = injector.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { injector.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(1200)).await;
    cancel.cancel();

    assert_eq!(task.await.unwrap(), InjectionOutcome::Cancelled);
    assert_eq!(window.probes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_probe_errors_count_as_not_ready() {
    let window = Arc::new(FakeWindow::new());
    // A closed window fails every evaluation.
    window.close().await.unwrap();

    let config = InjectionConfig {
        max_attempts: 3,
        fields: vec![FieldConfig::new("firstName", "#fn").required()],
        ..Default::default()
    };
    let injector = FieldInjector::new(window.clone(), &config, &matti());
    assert_eq!(
        injector.run(CancellationToken::new()).await,
        InjectionOutcome::GaveUp { attempts: 3 }
    );
}
