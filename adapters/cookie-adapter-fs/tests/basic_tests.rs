//! Basic cookie jar operation tests
//!
//! Tests read/write/remove against a file-backed jar and persistence across
//! adapter instances

use chrono::{TimeDelta, Utc};
use fides_cookie_adapter_fs::CookieAdapterFs;
use fides_types::cookie_adapter::{Cookie, CookieAdapter};
use fides_types::error::Error;
use tempfile::TempDir;

async fn create_test_adapter(host: &str) -> (CookieAdapterFs, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = CookieAdapterFs::new(temp_dir.path().into(), host)
		.await
		.expect("Failed to create adapter");
	(adapter, temp_dir)
}

fn cookie(name: &str, value: &str, domain: Option<&str>) -> Cookie {
	Cookie {
		name: name.to_string(),
		value: value.to_string(),
		domain: domain.map(str::to_string),
		path: "/".to_string(),
		expires: Some(Utc::now() + TimeDelta::days(365)),
	}
}

#[tokio::test]
async fn test_missing_jar_reads_empty() {
	let (adapter, _temp) = create_test_adapter("www.example.com").await;
	assert_eq!(adapter.read_cookie("fides_consent").await.expect("read"), None);
	assert!(!adapter.jar_file().exists());
}

#[tokio::test]
async fn test_write_and_read() {
	let (adapter, _temp) = create_test_adapter("www.example.com").await;
	adapter
		.write_cookie(&cookie("fides_consent", r#"{"consent":{}}"#, Some("example.com")))
		.await
		.expect("write");

	let value = adapter.read_cookie("fides_consent").await.expect("read");
	assert_eq!(value.as_deref(), Some(r#"{"consent":{}}"#));
}

#[tokio::test]
async fn test_write_replaces_same_slot() {
	let (adapter, _temp) = create_test_adapter("example.com").await;
	adapter.write_cookie(&cookie("c", "1", None)).await.expect("write");
	adapter.write_cookie(&cookie("c", "2", None)).await.expect("write");

	assert_eq!(adapter.read_cookie("c").await.expect("read").as_deref(), Some("2"));
	assert!(adapter.remove_cookie("c", "/", None).await.expect("remove"));
	assert_eq!(adapter.read_cookie("c").await.expect("read"), None);
}

#[tokio::test]
async fn test_persists_across_instances() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	{
		let adapter = CookieAdapterFs::new(temp_dir.path().into(), "shop.example.com")
			.await
			.expect("adapter");
		adapter.write_cookie(&cookie("fides_consent", "v1", Some("example.com"))).await.expect("write");
	}

	let adapter =
		CookieAdapterFs::new(temp_dir.path().into(), "shop.example.com").await.expect("adapter");
	assert_eq!(adapter.read_cookie("fides_consent").await.expect("read").as_deref(), Some("v1"));
}

#[tokio::test]
async fn test_foreign_domain_rejected() {
	let (adapter, _temp) = create_test_adapter("www.example.com").await;
	let result = adapter.write_cookie(&cookie("c", "1", Some("tracker.net"))).await;
	assert!(result.is_err());
	assert_eq!(adapter.read_cookie("c").await.expect("read"), None);
}

#[tokio::test]
async fn test_expired_cookie_is_dropped() {
	let (adapter, _temp) = create_test_adapter("example.com").await;
	let mut old = cookie("old", "x", None);
	old.expires = Some(Utc::now() - TimeDelta::seconds(5));
	adapter.write_cookie(&old).await.expect("write");

	assert_eq!(adapter.read_cookie("old").await.expect("read"), None);
}

#[tokio::test]
async fn test_remove_respects_domain() {
	let (adapter, _temp) = create_test_adapter("www.example.com").await;
	adapter.write_cookie(&cookie("_ga", "GA1", Some(".example.com"))).await.expect("write");

	assert!(!adapter.remove_cookie("_ga", "/", None).await.expect("remove"));
	assert!(!adapter.remove_cookie("_ga", "/other", Some("example.com")).await.expect("remove"));
	assert!(adapter.remove_cookie("_ga", "/", Some("example.com")).await.expect("remove"));
}

#[tokio::test]
async fn test_corrupt_jar_is_an_error() {
	let (adapter, _temp) = create_test_adapter("example.com").await;
	tokio::fs::write(adapter.jar_file(), b"not json").await.expect("write file");
	assert!(adapter.read_cookie("c").await.is_err());
}

#[tokio::test]
async fn test_invalid_hostname() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	assert!(CookieAdapterFs::new(temp_dir.path().into(), "../etc").await.is_err());
	assert!(CookieAdapterFs::new(temp_dir.path().into(), "  ").await.is_err());
}

#[tokio::test]
async fn test_base_path_is_a_file() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let file = temp_dir.path().join("not-a-dir");
	tokio::fs::write(&file, b"x").await.expect("write file");

	let result = CookieAdapterFs::new(file.into_boxed_path(), "example.com").await;
	assert!(matches!(result, Err(Error::StorageUnavailable)));
}

#[tokio::test]
async fn test_missing_base_dir_is_created() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let base = temp_dir.path().join("nested").join("jar");

	let adapter = CookieAdapterFs::new(base.clone().into_boxed_path(), "example.com")
		.await
		.expect("Failed to create adapter");
	assert!(base.is_dir());
	assert!(adapter.jar_file().starts_with(&base));
}

// vim: ts=4
