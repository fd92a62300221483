mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tasktide::{Event, EventKind, Scheduler, SchedulerConfig, Subscribe, Task, TaskConfig};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use common::{count, drain, fast_scheduler, wait_until};

#[tokio::test]
async fn concurrency_never_exceeds_max_workers() {
    let sched = fast_scheduler(2, 1);
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicUsize::new(0));
    let release = CancellationToken::new();

    for i in 0..6 {
        let (current, peak, done, release) =
            (current.clone(), peak.clone(), done.clone(), release.clone());
        let task = sched.tasks().task(format!("worker-{i}"), move |_ctx| {
            let (current, peak, done, release) =
                (current.clone(), peak.clone(), done.clone(), release.clone());
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                release.cancelled().await;
                current.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        sched.schedule_async(task, None);
    }

    assert!(wait_until(Duration::from_secs(2), || current.load(Ordering::SeqCst) == 2).await);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(current.load(Ordering::SeqCst), 2);
    assert_eq!(sched.available_workers(), 0);

    release.cancel();
    assert!(wait_until(Duration::from_secs(2), || done.load(Ordering::SeqCst) == 6).await);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
    assert!(wait_until(Duration::from_secs(1), || sched.available_workers() == 2).await);
}

#[tokio::test(start_paused = true)]
async fn ticker_with_wait_for_previous_never_overlaps() {
    let sched = fast_scheduler(4, 1);
    let mut rx = sched.subscribe();
    let runs: Arc<Mutex<Vec<(Instant, Instant)>>> = Arc::default();

    let r = runs.clone();
    let task = sched.tasks().task("slow-tick", move |_ctx| {
        let r = r.clone();
        async move {
            let start = Instant::now();
            tokio::time::sleep(Duration::from_millis(50)).await;
            r.lock().push((start, Instant::now()));
            Ok(())
        }
    });

    sched.schedule_periodic(
        task,
        Duration::from_millis(20),
        Some(TaskConfig::default().with_wait_for_previous(true)),
    );
    tokio::time::sleep(Duration::from_millis(400)).await;
    sched.reset().await;

    let mut runs = runs.lock().clone();
    runs.sort_by_key(|(start, _)| *start);
    assert!(runs.len() >= 3, "only {} runs", runs.len());
    for pair in runs.windows(2) {
        assert!(pair[1].0 >= pair[0].1, "runs overlapped: {pair:?}");
    }
    assert!(count(&drain(&mut rx), EventKind::TickSkipped) > 0);
}

#[tokio::test(start_paused = true)]
async fn ticker_without_wait_for_previous_allows_overlap() {
    let sched = fast_scheduler(4, 1);
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (a, p) = (active.clone(), peak.clone());
    let task = sched.tasks().task("overlapping", move |_ctx| {
        let (a, p) = (a.clone(), p.clone());
        async move {
            let now = a.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            a.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    });

    sched.schedule_periodic(task, Duration::from_millis(20), None);
    tokio::time::sleep(Duration::from_millis(200)).await;
    sched.reset().await;

    assert!(peak.load(Ordering::SeqCst) > 1);
}

#[tokio::test(start_paused = true)]
async fn interval_after_finish_keeps_minimum_gap() {
    let sched = fast_scheduler(1, 1);
    let runs: Arc<Mutex<Vec<(Instant, Instant)>>> = Arc::default();
    let interval = Duration::from_millis(100);

    let r = runs.clone();
    let task = sched.tasks().task("sequential", move |_ctx| {
        let r = r.clone();
        async move {
            let start = Instant::now();
            tokio::time::sleep(Duration::from_millis(30)).await;
            r.lock().push((start, Instant::now()));
            Ok(())
        }
    });

    let begun = Instant::now();
    sched.schedule_periodic(
        task,
        interval,
        Some(TaskConfig::default().with_interval_after_finish(true)),
    );
    tokio::time::sleep(Duration::from_millis(700)).await;
    sched.reset().await;

    let runs = runs.lock().clone();
    assert!(runs.len() >= 4, "only {} runs", runs.len());
    assert!(runs[0].0 - begun < interval, "first run should start immediately");
    for pair in runs.windows(2) {
        let gap = pair[1].0 - pair[0].1;
        assert!(gap >= interval, "gap {gap:?} shorter than {interval:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn ticker_first_fires_after_one_interval() {
    let sched = fast_scheduler(1, 1);
    let first: Arc<Mutex<Option<Instant>>> = Arc::default();

    let f = first.clone();
    let task = sched.tasks().task("first-tick", move |_ctx| {
        f.lock().get_or_insert_with(Instant::now);
        async { Ok(()) }
    });

    let begun = Instant::now();
    sched.schedule_periodic(task, Duration::from_millis(100), None);
    tokio::time::sleep(Duration::from_millis(150)).await;
    sched.reset().await;

    let at = first.lock().expect("ticker never fired");
    assert!(at - begun >= Duration::from_millis(100));
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let sched = Scheduler::new(1, 1);
    let mut rx = sched.subscribe();
    let ran = Arc::new(AtomicBool::new(false));

    let r = ran.clone();
    let task = sched.tasks().task("never", move |_ctx| {
        r.store(true, Ordering::SeqCst);
        async { Ok(()) }
    });
    sched.schedule_periodic(task, Duration::ZERO, None);

    assert_eq!(sched.outstanding(), 0);
    let events = drain(&mut rx);
    let skipped = events.iter().find(|e| e.kind == EventKind::TaskSkipped).unwrap();
    assert_eq!(skipped.reason.as_deref(), Some("zero_interval"));
    assert_eq!(skipped.epoch, Some(1));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn ticker_interval_beyond_the_clock_is_rejected() {
    let sched = Scheduler::new(1, 1);
    let mut rx = sched.subscribe();
    let ran = Arc::new(AtomicBool::new(false));

    let r = ran.clone();
    let task = sched.tasks().task("forever", move |_ctx| {
        r.store(true, Ordering::SeqCst);
        async { Ok(()) }
    });
    sched.schedule_periodic(task, Duration::MAX, None);

    assert_eq!(sched.outstanding(), 0);
    let events = drain(&mut rx);
    let skipped = events.iter().find(|e| e.kind == EventKind::TaskSkipped).unwrap();
    assert_eq!(skipped.reason.as_deref(), Some("interval_overflow"));
    assert_eq!(skipped.epoch, Some(1));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!ran.load(Ordering::SeqCst));
    sched.reset().await;
    assert_eq!(count(&drain(&mut rx), EventKind::ResetCompleted), 1);
}

#[tokio::test]
async fn sequential_mode_tolerates_huge_interval() {
    let sched = Scheduler::new(1, 1);
    let calls = Arc::new(AtomicUsize::new(0));

    let c = calls.clone();
    let task = sched.tasks().task("once-then-wait", move |_ctx| {
        c.fetch_add(1, Ordering::SeqCst);
        async { Ok(()) }
    });
    sched.schedule_periodic(
        task,
        Duration::MAX,
        Some(TaskConfig::default().with_interval_after_finish(true)),
    );

    assert!(wait_until(Duration::from_secs(1), || calls.load(Ordering::SeqCst) == 1).await);
    assert_eq!(sched.outstanding(), 1);

    tokio::time::timeout(Duration::from_secs(1), sched.reset())
        .await
        .expect("reset hung on a sleeping loop");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn schedule_after_runs_once_delay_elapses() {
    let sched = Scheduler::new(1, 1);
    let ran_at: Arc<Mutex<Option<std::time::Instant>>> = Arc::default();

    let r = ran_at.clone();
    let task = sched.tasks().task("delayed", move |_ctx| {
        *r.lock() = Some(std::time::Instant::now());
        async { Ok(()) }
    });

    let begun = std::time::Instant::now();
    sched.schedule_after(task, Duration::from_millis(40), None);
    assert!(ran_at.lock().is_none());

    assert!(wait_until(Duration::from_secs(2), || ran_at.lock().is_some()).await);
    let at = ran_at.lock().unwrap();
    assert!(at - begun >= Duration::from_millis(40));
}

struct Recorder {
    seen: Mutex<Vec<Event>>,
}

#[async_trait::async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.seen.lock().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn subscribers_receive_events_in_order() {
    let recorder = Arc::new(Recorder {
        seen: Mutex::new(Vec::new()),
    });
    let sched = Scheduler::builder(SchedulerConfig::new(1, 1))
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    let task = sched.tasks().task("observed", |_ctx| async { Ok(()) });
    let id = task.id();
    sched.schedule_now(task, None).await;

    assert!(wait_until(Duration::from_secs(1), || recorder.seen.lock().len() >= 2).await);
    let seen = recorder.seen.lock().clone();
    let kinds: Vec<EventKind> = seen.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::TaskStarting, EventKind::TaskSucceeded]);
    assert!(seen.iter().all(|e| e.task_id == Some(id)));
    assert!(seen[0].seq < seen[1].seq);
}
