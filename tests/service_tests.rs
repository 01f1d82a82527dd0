//! Job pool and status surface tests.

use encounter_explorer::games::duel::{Combatant, Duel, DuelBuilder, MoveSpec};
use encounter_explorer::service::{JobId, Response, StatusService, WorkPool};
use encounter_explorer::{BattleEngine, ExplorerConfig, ServiceConfig, SideId, Snapshot};

/// A duel with two options per side and nothing random: four paths at depth 1.
fn base() -> Snapshot {
    let unit = |name: &str, speed| {
        Combatant::new(name, 200)
            .with_stats(10, 10, speed)
            .with_move(MoveSpec::new("Tackle", 10).with_crit(false))
            .with_move(MoveSpec::new("Slam", 20).with_crit(false))
    };
    DuelBuilder::new()
        .team(SideId::new(0), vec![unit("Alpha", 20)])
        .team(SideId::new(1), vec![unit("Beta", 10)])
        .team_preview(false)
        .damage_variance(false)
        .build()
        .snapshot()
        .unwrap()
}

fn service() -> StatusService<Duel> {
    StatusService::new(base(), ServiceConfig::default().with_default_page_size(3))
}

fn finished_job(service: &mut StatusService<Duel>) -> JobId {
    let id = service.start().unwrap().id;
    let status = service.pool_mut().wait(id).unwrap();
    assert!(status.finished);
    id
}

/// Test that a job streams all of its results and finishes.
#[test]
fn test_job_runs_to_completion() {
    let mut pool = WorkPool::new();
    let id = pool.start_new::<Duel>(base(), ExplorerConfig::new()).unwrap();

    let status = pool.wait(id).unwrap();
    assert!(status.finished);
    assert_eq!(status.result_count, 4);
    assert_eq!(status.error, None);

    let (_, page) = pool.results(id, 0, 10).unwrap();
    let paths: Vec<String> = page.iter().map(|r| r.path.to_string()).collect();
    assert_eq!(paths, vec!["([0];[0])<>", "([0];[1])<>", "([1];[0])<>", "([1];[1])<>"]);
}

/// Test that each pool hands out its own job ids.
#[test]
fn test_job_ids_per_pool() {
    let mut first = WorkPool::new();
    let mut second = WorkPool::new();

    let a = first.start_new::<Duel>(base(), ExplorerConfig::new()).unwrap();
    let b = first.start_new::<Duel>(base(), ExplorerConfig::new()).unwrap();
    let c = second.start_new::<Duel>(base(), ExplorerConfig::new()).unwrap();

    assert_eq!((a, b, c), (JobId(0), JobId(1), JobId(0)));
    assert_eq!(first.job_ids(), vec![JobId(0), JobId(1)]);
    first.wait(a);
    first.wait(b);
    second.wait(c);
}

/// Test that a broken snapshot is recorded as a job error.
#[test]
fn test_failed_job_reports_error() {
    let mut pool = WorkPool::new();
    let id = pool
        .start_new::<Duel>(Snapshot(vec![0xff]), ExplorerConfig::new())
        .unwrap();

    let status = pool.wait(id).unwrap();
    assert!(status.finished);
    assert_eq!(status.result_count, 0);
    assert!(status.error.is_some());
}

/// Test the start summary links.
#[test]
fn test_start_summary() {
    let mut service = service();
    let summary = service.start().unwrap();

    assert_eq!(summary.id, JobId(0));
    assert_eq!(summary.status_link, "http://localhost:8080/explorer/status/0");
    assert_eq!(summary.results_link, "http://localhost:8080/explorer/results/0");
    service.pool_mut().wait(summary.id);
}

/// Test pagination links across pages.
#[test]
fn test_results_pagination() {
    let mut service = service();
    let id = finished_job(&mut service);

    let first = service.results(id, 0, 3).unwrap();
    assert_eq!(first.results.len(), 3);
    assert_eq!(first.result_count, 4);
    assert!(first.finished);
    assert_eq!(first.prev_link, None);
    assert_eq!(
        first.next_link.as_deref(),
        Some("http://localhost:8080/explorer/results/0?skip=3&count=3")
    );

    let second = service.results(id, 3, 3).unwrap();
    assert_eq!(second.results.len(), 1);
    assert_eq!(
        second.prev_link.as_deref(),
        Some("http://localhost:8080/explorer/results/0?skip=0&count=3")
    );
    assert_eq!(second.next_link, None);
    assert_eq!(
        second.self_link,
        "http://localhost:8080/explorer/results/0?skip=3&count=3"
    );

    let past_end = service.results(id, 10, 3).unwrap();
    assert!(past_end.results.is_empty());
}

/// Test routing of status and results targets.
#[test]
fn test_route() {
    let mut service = service();
    let id = finished_job(&mut service);

    let Response::Json(status) = service.route(&format!("/explorer/status/{id}")) else {
        panic!("status should be found");
    };
    assert_eq!(status["resultCount"], 4);
    assert_eq!(status["finished"], true);
    assert_eq!(status["statusLink"], "http://localhost:8080/explorer/status/0");

    let Response::Json(page) = service.route("/explorer/results/0?skip=1&count=2") else {
        panic!("results should be found");
    };
    assert_eq!(page["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(page["prevLink"], serde_json::Value::Null);
    assert_eq!(
        page["nextLink"],
        "http://localhost:8080/explorer/results/0?skip=3&count=2"
    );

    // default page size applies when count is missing or malformed
    let Response::Json(page) = service.route("/explorer/results/0?count=lots") else {
        panic!("results should be found");
    };
    assert_eq!(page["results"].as_array().map(Vec::len), Some(3));
}

/// Test that unknown ids and malformed targets are not found.
#[test]
fn test_route_not_found() {
    let mut service = service();
    let id = finished_job(&mut service);
    assert_eq!(id, JobId(0));

    for target in [
        "/explorer/status/7",
        "/explorer/results/7",
        "/explorer/status/abc",
        "/explorer/status",
        "/explorer/bogus/0",
        "/explorer",
        "/other/status/0",
        "",
    ] {
        assert_eq!(service.route(target), Response::NotFound, "{target}");
    }
}

/// Test that the start route launches a job.
#[test]
fn test_route_start() {
    let mut service = service();

    let Response::Json(summary) = service.route("/explorer/start") else {
        panic!("start should succeed");
    };
    assert_eq!(summary["id"], 0);
    assert_eq!(summary["finished"], false);
    service.pool_mut().wait(JobId(0));
}

/// Test that query values are percent-decoded and fragments ignored.
#[test]
fn test_route_decodes_query() {
    let mut service = service();
    let id = finished_job(&mut service);

    let Response::Json(page) = service.route(&format!("/explorer/results/{id}?skip=%32&count=%31")) else {
        panic!("results should be found");
    };
    assert_eq!(page["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        page["selfLink"],
        "http://localhost:8080/explorer/results/0?skip=2&count=1"
    );

    let Response::Json(page) = service.route("/explorer/results/0?skip=2&count=1#top") else {
        panic!("results should be found");
    };
    assert_eq!(
        page["selfLink"],
        "http://localhost:8080/explorer/results/0?skip=2&count=1"
    );

    let Response::Json(status) = service.route("http://localhost:8080/explorer/status/0") else {
        panic!("absolute targets should route");
    };
    assert_eq!(status["resultCount"], 4);
}
