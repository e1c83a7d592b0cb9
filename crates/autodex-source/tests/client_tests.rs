// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use autodex_app::{DetailCache, DetailSource, MakeId, TrimId, present_detail};
use autodex_source::{Client, DataSource, DirectorySource};
use autodex_testkit::{catalog_json, honda_catalog, honda_detail_json, temp_data_dir};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_response(body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(200)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

#[test]
fn unreachable_server_error_names_remediation() {
    let client =
        Client::new("http://127.0.0.1:1/web_data", Duration::from_millis(50)).expect("client");
    let error = client
        .fetch_catalog()
        .expect_err("fetch should fail for unreachable endpoint");
    let message = format!("{error:#}");
    assert!(message.contains("127.0.0.1:1"));
    assert!(message.contains("data.base_url") || message.contains("data.timeout"));
}

#[test]
fn catalog_and_details_load_from_mock_server() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/web_data", server.server_addr());
    let index = catalog_json(&honda_catalog())?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("index request expected");
        assert_eq!(request.url(), "/web_data/index.json");
        request
            .respond(json_response(&index))
            .expect("response should succeed");

        let request = server.recv().expect("detail request expected");
        assert_eq!(request.url(), "/web_data/details/honda.json");
        request
            .respond(json_response(honda_detail_json()))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let catalog = client.fetch_catalog()?;
    assert_eq!(catalog, honda_catalog());

    let table = client.fetch_make_details(&MakeId::from("honda"))?;
    assert_eq!(table.len(), 2);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn detail_cache_fetches_each_make_once_over_http() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("detail request expected");
        assert_eq!(request.url(), "/details/honda.json");
        request
            .respond(json_response(honda_detail_json()))
            .expect("response should succeed");
    });

    let mut source = DataSource::Http(Client::new(&addr, Duration::from_secs(2))?);
    let mut cache = DetailCache::new();
    let make = MakeId::from("honda");
    let first = present_detail(&mut cache, &mut source, &make, &TrimId::from("c1"))?;
    let second = present_detail(&mut cache, &mut source, &make, &TrimId::from("c2"))?;
    assert_eq!(first.title, "2020 Honda Civic");
    assert_eq!(second.title, "2022 Honda Civic");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn http_errors_are_reported_with_status() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(Response::from_string("missing").with_status_code(404))
            .expect("response should succeed");

        let request = server.recv().expect("request expected");
        request
            .respond(Response::from_string("overloaded").with_status_code(503))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let not_found = client
        .fetch_make_details(&MakeId::from("saab"))
        .expect_err("404 should fail");
    assert!(not_found.to_string().contains("404"));

    let unavailable = client.fetch_catalog().expect_err("503 should fail");
    assert_eq!(unavailable.to_string(), "server error (503): overloaded");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn malformed_index_is_a_decode_error() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"makes": []}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(2))?;
    let error = client.fetch_catalog().expect_err("object is not an index");
    assert!(format!("{error:#}").contains("expected a JSON array"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn directory_source_reads_exported_layout() -> Result<()> {
    let (_dir, root) = temp_data_dir(&honda_catalog(), &[("honda", honda_detail_json())])?;
    let mut source = DataSource::Directory(DirectorySource::new(&root)?);

    assert_eq!(source.load_catalog()?, honda_catalog());
    let table = source.fetch_make_details(&MakeId::from("honda"))?;
    assert_eq!(table.len(), 2);

    let error = source
        .fetch_make_details(&MakeId::from("toyota"))
        .expect_err("missing detail file should fail");
    assert!(format!("{error:#}").contains("toyota.json"));
    assert_eq!(source.to_string(), root.display().to_string());
    Ok(())
}
