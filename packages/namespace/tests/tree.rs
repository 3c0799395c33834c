//! The namespace driven through its files, against a fake API.

mod common;

use serde_json::{json, Value};

use mackerelfs_core::{path, read_dir, read_file, write_file, ErrorKind, Filesystem, Path};
use mackerelfs_namespace::Namespace;

use common::{names, namespace, FakeApi, FakeHost, API_KEY};

fn with_acme() -> (Namespace, std::sync::Arc<FakeApi>) {
    let api = FakeApi::acme();
    let ns = namespace(api.clone());
    write_file(&ns, &path!("ctl"), format!("new {API_KEY}\n").as_bytes()).unwrap();
    (ns, api)
}

fn text(fs: &dyn Filesystem, p: &str) -> String {
    let bytes = read_file(fs, &Path::parse(p).unwrap()).unwrap();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn starts_empty() {
    let ns = namespace(FakeApi::acme());
    assert_eq!(names(&ns, "."), vec!["ctl"]);
    assert!(ns.orgs().is_empty());
}

#[test]
fn layout() {
    let (ns, _) = with_acme();
    assert_eq!(names(&ns, "."), vec!["acme", "ctl"]);
    assert_eq!(names(&ns, "acme"), vec!["hosts", "services"]);
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);
    assert_eq!(names(&ns, "acme/hosts/web-1"), vec!["ctl", "info", "metrics"]);
    assert_eq!(names(&ns, "acme/hosts/web-1/metrics"), vec!["ctl", "loadavg5"]);
    assert_eq!(names(&ns, "acme/hosts/web-1/metrics/loadavg5"), vec!["1hour"]);
    assert_eq!(names(&ns, "acme/services"), vec!["ctl", "shop"]);
    assert_eq!(
        names(&ns, "acme/services/shop"),
        vec!["app", "ctl", "db", "metrics"]
    );
    assert_eq!(names(&ns, "acme/services/shop/app"), vec!["ctl", "memo", "web-1"]);
    assert_eq!(names(&ns, "acme/services/shop/db"), vec!["ctl", "db-1", "memo"]);
}

#[test]
fn entries_agree_with_what_opens() {
    let (ns, _) = with_acme();
    walk(&ns, &Path::root());
}

fn walk(fs: &dyn Filesystem, dir: &Path) {
    for entry in read_dir(fs, dir).unwrap() {
        let child = dir.child(entry.name());
        let info = entry.info().unwrap_or_else(|e| panic!("info {child}: {e}"));
        let status = fs.stat(&child).unwrap_or_else(|e| panic!("stat {child}: {e}"));
        assert_eq!(info.name, entry.name());
        assert_eq!(status.name, entry.name());
        assert_eq!(status.is_dir(), entry.is_dir(), "type of {child}");
        if entry.is_dir() {
            walk(fs, &child);
        }
    }
}

#[test]
fn host_info_is_indented_json() {
    let (ns, _) = with_acme();
    let info = text(&ns, "acme/hosts/web-1/info");
    assert!(info.ends_with("}\n"));
    assert!(info.contains("\n  \"name\": \"web-1\""));
    let doc: Value = serde_json::from_str(&info).unwrap();
    assert_eq!(doc, json!({"id": "h1", "name": "web-1", "memo": ""}));
}

#[test]
fn host_info_is_cached_until_ctl() {
    let (ns, api) = with_acme();
    let _ = text(&ns, "acme/hosts/web-1/info");
    let _ = text(&ns, "acme/hosts/web-1/info");
    assert_eq!(api.calls_to("host h1"), 1);

    api.state.lock().hosts[0].memo = "rebooted".into();
    assert!(!text(&ns, "acme/hosts/web-1/info").contains("rebooted"));

    // blank lines do nothing
    write_file(&ns, &path!("acme/hosts/web-1/ctl"), b"\n").unwrap();
    assert_eq!(api.calls_to("host h1"), 1);

    write_file(&ns, &path!("acme/hosts/web-1/ctl"), b"refresh\n").unwrap();
    assert_eq!(api.calls_to("host h1"), 2);
    assert!(text(&ns, "acme/hosts/web-1/info").contains("\"memo\": \"rebooted\""));
}

#[test]
fn host_list_reloads_on_any_line() {
    let (ns, api) = with_acme();
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);

    api.state.lock().hosts.push(FakeHost::new("h3", "web-2"));
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);

    write_file(&ns, &path!("acme/hosts/ctl"), b"\n").unwrap();
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);

    write_file(&ns, &path!("acme/hosts/ctl"), b"x\n").unwrap();
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1", "web-2"]);
}

#[test]
fn metric_file_covers_the_last_hour() {
    let (ns, api) = with_acme();
    assert_eq!(
        text(&ns, "acme/hosts/web-1/metrics/loadavg5/1hour"),
        "loadavg5\t0.250000\t100\nloadavg5\t1.500000\t160\n"
    );
    let (from, to) = api.last_range.lock().unwrap();
    assert_eq!(to - from, 3600);

    assert_eq!(
        text(&ns, "acme/services/shop/metrics/orders/1hour"),
        "orders\t7.000000\t42\n"
    );
}

#[test]
fn metric_names_reload_on_any_line() {
    let (ns, api) = with_acme();
    assert_eq!(names(&ns, "acme/hosts/web-1/metrics"), vec!["ctl", "loadavg5"]);

    api.state
        .lock()
        .host_metrics
        .get_mut("h1")
        .unwrap()
        .insert("cpu.user.percentage".into(), Vec::new());
    assert_eq!(names(&ns, "acme/hosts/web-1/metrics"), vec!["ctl", "loadavg5"]);

    write_file(&ns, &path!("acme/hosts/web-1/metrics/ctl"), b"reload\n").unwrap();
    assert_eq!(
        names(&ns, "acme/hosts/web-1/metrics"),
        vec!["cpu.user.percentage", "ctl", "loadavg5"]
    );
    assert_eq!(
        text(&ns, "acme/hosts/web-1/metrics/cpu.user.percentage/1hour"),
        ""
    );
}

#[test]
fn role_memo_and_members() {
    let (ns, _) = with_acme();
    assert_eq!(text(&ns, "acme/services/shop/app/memo"), "frontends\n");
    assert_eq!(text(&ns, "acme/services/shop/db/memo"), "");
    let info: Value =
        serde_json::from_str(&text(&ns, "acme/services/shop/db/db-1/info")).unwrap();
    assert_eq!(info["id"], "h2");
}

#[test]
fn service_controls_need_the_reload_word() {
    let (ns, api) = with_acme();
    assert_eq!(names(&ns, "acme/services"), vec!["ctl", "shop"]);

    {
        let mut state = api.state.lock();
        state.services.push(mackerelfs_client::Service {
            name: "blog".into(),
            memo: String::new(),
            roles: Vec::new(),
        });
        state.roles.insert("blog".into(), Vec::new());
        state.hosts.push(FakeHost::new("h3", "app-2").in_role("shop", "app"));
    }

    write_file(&ns, &path!("acme/services/ctl"), b"refresh\n").unwrap();
    assert_eq!(names(&ns, "acme/services"), vec!["ctl", "shop"]);
    write_file(&ns, &path!("acme/services/ctl"), b"reload\n").unwrap();
    assert_eq!(names(&ns, "acme/services"), vec!["blog", "ctl", "shop"]);
    assert_eq!(api.calls_to("services"), 2);

    assert_eq!(names(&ns, "acme/services/shop/app"), vec!["app-2", "ctl", "memo", "web-1"]);
}

#[test]
fn role_ctl_reloads_members() {
    let (ns, api) = with_acme();
    assert_eq!(names(&ns, "acme/services/shop/db"), vec!["ctl", "db-1", "memo"]);

    api.state
        .lock()
        .hosts
        .push(FakeHost::new("h4", "db-2").in_role("shop", "db"));
    write_file(&ns, &path!("acme/services/shop/db/ctl"), b"reload\n").unwrap();
    assert_eq!(
        names(&ns, "acme/services/shop/db"),
        vec!["ctl", "db-1", "db-2", "memo"]
    );
}

#[test]
fn root_ctl_adds_and_deletes() {
    let (ns, _) = with_acme();
    assert_eq!(ns.orgs(), vec!["acme"]);

    write_file(&ns, &path!("ctl"), b"\n   \n").unwrap();
    write_file(&ns, &path!("ctl"), b"delete nobody\n").unwrap();
    assert_eq!(ns.orgs(), vec!["acme"]);

    write_file(&ns, &path!("ctl"), b"delete acme\n").unwrap();
    assert!(ns.orgs().is_empty());
    let e = ns.stat(&path!("acme/hosts")).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::NotExist);
}

#[test]
fn root_ctl_rejects_bad_lines() {
    let (ns, _) = with_acme();

    let e = write_file(&ns, &path!("ctl"), b"new\n").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidPath);
    assert_eq!(e.path(), "ctl");
    assert!(e.to_string().contains("missing arguments"));

    let e = write_file(&ns, &path!("ctl"), b"delete\n").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidPath);

    let e = write_file(&ns, &path!("ctl"), b"new wrong-key\n").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Upstream);
    assert!(e.to_string().contains("invalid api key"));

    assert_eq!(ns.orgs(), vec!["acme"]);
}

#[test]
fn root_ctl_ignores_unknown_verbs() {
    let (ns, _) = with_acme();
    write_file(&ns, &path!("ctl"), b"rename acme other\nreload\n").unwrap();
    assert_eq!(ns.orgs(), vec!["acme"]);
}

#[test]
fn add_and_remove_directly() {
    let ns = namespace(FakeApi::acme());
    assert_eq!(ns.add_org(API_KEY).unwrap(), "acme");
    assert_eq!(ns.orgs(), vec!["acme"]);

    let e = ns.add_org("nope").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Upstream);
    assert_eq!(e.op(), "new");

    assert!(ns.remove_org("acme"));
    assert!(!ns.remove_org("acme"));
}

#[test]
fn failed_fetch_is_reported_and_retried() {
    let (ns, api) = with_acme();
    api.state.lock().unavailable = true;

    let e = ns.stat(&path!("acme/hosts")).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Upstream);
    assert_eq!(e.path(), "acme/hosts");
    assert!(e.to_string().contains("service unavailable"));

    api.state.lock().unavailable = false;
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);
}

#[test]
fn failed_reload_keeps_the_old_listing() {
    let (ns, api) = with_acme();
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);

    api.state.lock().unavailable = true;
    let e = write_file(&ns, &path!("acme/hosts/ctl"), b"reload\n").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Upstream);

    api.state.lock().unavailable = false;
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);
}

#[test]
fn hosts_with_unusable_names_are_skipped() {
    let api = FakeApi::acme();
    api.state.lock().hosts.push(FakeHost::new("h9", "bad/name"));
    let ns = namespace(api);
    write_file(&ns, &path!("ctl"), format!("new {API_KEY}\n").as_bytes()).unwrap();
    assert_eq!(names(&ns, "acme/hosts"), vec!["ctl", "db-1", "web-1"]);
}

#[test]
fn missing_entries_are_not_found() {
    let (ns, _) = with_acme();
    for p in ["nope", "acme/nope", "acme/hosts/nope", "acme/services/shop/nope/memo"] {
        let e = ns.stat(&Path::parse(p).unwrap()).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::NotExist, "{p}");
        assert_eq!(e.path(), p);
    }
}
