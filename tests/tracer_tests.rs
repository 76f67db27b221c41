//! Estimator and scope-recording tests for gctracer.

use gctracer::{
    average_speed, BytesAndDuration, Collector, GcTracer, HeapSample, RingBuffer, ScopeId, MAX_SPEED,
    MB, RING_BUFFER_SIZE,
};

fn sample_and_add_allocation(
    tracer: &mut GcTracer,
    time_ms: f64,
    new_space_counter_bytes: u64,
    old_generation_counter_bytes: u64,
) {
    tracer.sample_allocation(time_ms, new_space_counter_bytes, old_generation_counter_bytes);
    tracer.add_allocation(time_ms);
}

#[test]
fn test_average_speed() {
    let mut buffer: RingBuffer<BytesAndDuration> = RingBuffer::new();
    let current = BytesAndDuration::new(100, 2.0);
    assert_eq!(average_speed(&buffer, current, None), 100.0 / 2.0);

    buffer.push(BytesAndDuration::new(100, 8.0));
    assert_eq!(average_speed(&buffer, current, Some(2.0)), 100.0 / 2.0);
    assert_eq!(average_speed(&buffer, current, Some(3.0)), 200.0 / 10.0);

    buffer.reset();
    buffer.push(BytesAndDuration::new(1024 * MB, 0.5));
    assert_eq!(
        average_speed(&buffer, BytesAndDuration::zero(), Some(1.0)),
        MAX_SPEED
    );

    buffer.reset();
    buffer.push(BytesAndDuration::new(1, 10_000.0));
    assert_eq!(average_speed(&buffer, BytesAndDuration::zero(), Some(1.0)), 1.0);

    buffer.reset();
    let mut sum = 0u64;
    for i in 0..RING_BUFFER_SIZE as u64 {
        sum += i + 1;
        buffer.push(BytesAndDuration::new(i + 1, 1.0));
    }
    let window = Some(RING_BUFFER_SIZE as f64);
    assert_eq!(
        average_speed(&buffer, BytesAndDuration::zero(), window),
        sum as f64 / RING_BUFFER_SIZE as f64
    );

    buffer.push(BytesAndDuration::new(100, 1.0));
    assert_eq!(
        average_speed(&buffer, BytesAndDuration::zero(), window),
        (sum as f64 - 1.0 + 100.0) / RING_BUFFER_SIZE as f64
    );
}

#[test]
fn test_allocation_throughput() {
    let mut tracer = GcTracer::new();
    tracer.reset_for_testing();

    let (time1, counter1) = (100.0, 1_000);
    // The first sample only creates the baseline.
    tracer.sample_allocation(time1, counter1, counter1);
    sample_and_add_allocation(&mut tracer, time1, counter1, counter1);

    let (time2, counter2) = (200.0, 2_000);
    sample_and_add_allocation(&mut tracer, time2, counter2, counter2);
    // Only the latest period fits in the window.
    let throughput = tracer.allocation_throughput(Some(100.0)) as u64;
    assert_eq!(throughput, 2 * (counter2 - counter1) / (time2 - time1) as u64);

    let (time3, counter3) = (1_000.0, 30_000);
    sample_and_add_allocation(&mut tracer, time3, counter3, counter3);
    // The last two periods.
    let throughput = tracer.allocation_throughput(Some(801.0)) as u64;
    assert_eq!(throughput, 2 * (counter3 - counter1) / (time3 - time1) as u64);
}

#[test]
fn test_new_space_allocation_throughput() {
    let mut tracer = GcTracer::new();

    let (time1, counter1) = (100.0, 1_000);
    sample_and_add_allocation(&mut tracer, time1, counter1, 0);
    let (time2, counter2) = (200.0, 2_000);
    sample_and_add_allocation(&mut tracer, time2, counter2, 0);
    let throughput = tracer.new_space_allocation_throughput(None) as u64;
    assert_eq!(throughput, (counter2 - counter1) / (time2 - time1) as u64);

    let (time3, counter3) = (1_000.0, 30_000);
    sample_and_add_allocation(&mut tracer, time3, counter3, 0);
    let throughput = tracer.new_space_allocation_throughput(None) as u64;
    assert_eq!(throughput, (counter3 - counter1) / (time3 - time1) as u64);
}

#[test]
fn test_new_space_allocation_throughput_with_window() {
    let mut tracer = GcTracer::new();

    let (time1, counter1) = (100.0, 1_000);
    sample_and_add_allocation(&mut tracer, time1, counter1, 0);
    let (time2, counter2) = (200.0, 2_000);
    sample_and_add_allocation(&mut tracer, time2, counter2, 0);
    let throughput = tracer.new_space_allocation_throughput(Some(100.0)) as u64;
    assert_eq!(throughput, (counter2 - counter1) / (time2 - time1) as u64);

    let (time3, counter3) = (1_000.0, 30_000);
    sample_and_add_allocation(&mut tracer, time3, counter3, 0);
    let throughput = tracer.new_space_allocation_throughput(Some(801.0)) as u64;
    assert_eq!(throughput, (counter3 - counter1) / (time3 - time1) as u64);
}

#[test]
fn test_old_generation_allocation_throughput_with_window() {
    let mut tracer = GcTracer::new();

    let (time1, counter1) = (100.0, 1_000);
    sample_and_add_allocation(&mut tracer, time1, 0, counter1);
    let (time2, counter2) = (200.0, 2_000);
    sample_and_add_allocation(&mut tracer, time2, 0, counter2);
    let throughput = tracer.old_generation_allocation_throughput(Some(100.0)) as u64;
    assert_eq!(throughput, (counter2 - counter1) / (time2 - time1) as u64);

    let (time3, counter3) = (1_000.0, 30_000);
    sample_and_add_allocation(&mut tracer, time3, 0, counter3);
    let throughput = tracer.old_generation_allocation_throughput(Some(801.0)) as u64;
    assert_eq!(throughput, (counter3 - counter1) / (time3 - time1) as u64);
}

#[test]
fn test_current_throughput_uses_five_second_window() {
    let mut tracer = GcTracer::new();
    sample_and_add_allocation(&mut tracer, 0.0, 0, 0);
    // An old, slow period followed by a long, fast one.
    sample_and_add_allocation(&mut tracer, 1_000.0, 1_000, 0);
    sample_and_add_allocation(&mut tracer, 7_000.0, 601_000, 0);

    assert_eq!(
        tracer.new_space_allocation_throughput(Some(5_000.0)),
        100.0
    );
    assert_eq!(
        tracer.new_space_allocation_throughput(None),
        601_000.0 / 7_000.0
    );
    // Time passed without old-generation allocation: clamped to the floor.
    assert_eq!(tracer.current_old_generation_allocation_throughput(), 1.0);
    assert_eq!(tracer.current_allocation_throughput(), 101.0);
}

#[test]
fn test_regular_scope() {
    let mut tracer = GcTracer::new();

    // Not recorded: no cycle is running.
    tracer.add_scope_sample(ScopeId::McMark, 100.0);

    tracer.start(
        Collector::MarkCompactor,
        "gc unittest",
        Some("collector unittest"),
        HeapSample::at(0.0),
    );
    tracer.add_scope_sample(ScopeId::McMark, 100.0);
    tracer.stop(Collector::MarkCompactor, HeapSample::at(150.0));

    assert_eq!(tracer.current_event().scope(ScopeId::McMark) as u64, 100);
}

#[test]
fn test_incremental_scope() {
    let mut tracer = GcTracer::new();

    // Recorded even outside a cycle: the scope is incremental.
    tracer.add_scope_sample(ScopeId::McIncrementalFinalize, 100.0);

    tracer.notify_incremental_marking_start(0.0);
    tracer.start(
        Collector::MarkCompactor,
        "gc unittest",
        Some("collector unittest"),
        HeapSample::at(0.0),
    );
    tracer.add_scope_sample(ScopeId::McIncrementalFinalize, 100.0);
    tracer.stop(Collector::MarkCompactor, HeapSample::at(250.0));

    assert_eq!(
        tracer
            .current_event()
            .scope(ScopeId::McIncrementalFinalize) as u64,
        200
    );
}

#[test]
fn test_incremental_scope_not_copied_into_full_mark_compact() {
    let mut tracer = GcTracer::new();
    tracer.add_scope_sample(ScopeId::McIncrementalFinalize, 100.0);

    tracer.start(Collector::MarkCompactor, "test", None, HeapSample::at(0.0));
    tracer.stop(Collector::MarkCompactor, HeapSample::at(10.0));

    assert_eq!(
        tracer.current_event().scope(ScopeId::McIncrementalFinalize),
        0.0
    );
    assert_eq!(
        tracer
            .current_event()
            .incremental_marking_scope(ScopeId::McIncrementalFinalize)
            .map(|infos| infos.steps),
        Some(0)
    );
    // The pending sample is discarded with the mark-compact.
    assert_eq!(
        tracer.incremental_scope(ScopeId::McIncrementalFinalize).steps,
        0
    );
}

#[test]
fn test_reset_for_testing_is_idempotent() {
    let mut tracer = GcTracer::new();
    sample_and_add_allocation(&mut tracer, 0.0, 0, 0);
    sample_and_add_allocation(&mut tracer, 10.0, 1_000, 1_000);
    tracer.add_scope_sample(ScopeId::McIncremental, 3.0);
    tracer.add_survival_ratio(0.5);
    tracer.start(Collector::Scavenger, "test", None, HeapSample::at(20.0));

    tracer.reset_for_testing();
    let once = tracer.stats();
    assert!(!tracer.is_running());
    assert_eq!(tracer.allocation_throughput(None), 0.0);
    assert_eq!(tracer.incremental_scope(ScopeId::McIncremental).duration, 0.0);

    tracer.reset_for_testing();
    assert_eq!(tracer.stats(), once);
    assert_eq!(tracer.stats(), GcTracer::new().stats());
}
