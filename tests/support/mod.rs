//! Shared fixtures for integration tests: encoded images and a mock
//! metadata service serving one series.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SERIES_ID: &str = "merakiscans:senryu-girl";
pub const SERIES_TITLE: &str = "Senryu Girl";

/// Encodes a small solid-color image in `format`.
pub fn encode(format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, image::Rgb([30, 160, 220])));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .expect("fixture image should encode");
    out.into_inner()
}

pub fn png() -> Vec<u8> {
    encode(ImageFormat::Png)
}

pub fn webp() -> Vec<u8> {
    encode(ImageFormat::WebP)
}

pub fn chapter_id(number: usize) -> String {
    format!("{SERIES_ID}:{number}")
}

/// Canonical URL the metadata client asks about for a chapter.
pub fn chapter_url(number: usize) -> String {
    format!("http://merakiscans.com/senryu-girl/{number}/")
}

pub fn series_url() -> String {
    "http://merakiscans.com/senryu-girl/".to_string()
}

/// Image path served by [`mount_images`] for a page.
pub fn page_path(chapter: usize, page: usize) -> String {
    format!("/img/{chapter}/{page}")
}

/// Series JSON as the metadata service returns it. Chapter numbers are sent
/// as strings, like some scrapers do.
pub fn series_json(server: &MockServer, chapters: usize) -> Value {
    let chapters: Vec<Value> = (1..=chapters)
        .map(|n| {
            json!({
                "id": chapter_id(n),
                "chapterNumber": n.to_string(),
                "title": format!("Verse {n}"),
                "url": chapter_url(n),
                "createdAt": 1_530_000_000 + n,
            })
        })
        .collect();
    json!({
        "id": SERIES_ID,
        "title": SERIES_TITLE,
        "url": series_url(),
        "slug": "senryu-girl",
        "coverImageUrl": format!("{}/img/cover", server.uri()),
        "chapters": chapters,
    })
}

pub fn chapter_json(server: &MockServer, chapter: usize, pages: usize) -> Value {
    let pages: Vec<Value> = (1..=pages)
        .map(|p| json!({ "url": format!("{}{}", server.uri(), page_path(chapter, p)) }))
        .collect();
    json!({
        "id": chapter_id(chapter),
        "pages": pages,
    })
}

/// Mounts `/api/series` and `/api/chapter` for a series with `chapters`
/// chapters of `pages` pages each.
pub async fn mount_metadata(server: &MockServer, chapters: usize, pages: usize) {
    Mock::given(method("GET"))
        .and(path("/api/series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_json(server, chapters)))
        .mount(server)
        .await;

    for n in 1..=chapters {
        Mock::given(method("GET"))
            .and(path("/api/chapter"))
            .and(query_param("url", chapter_url(n).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(chapter_json(server, n, pages)))
            .mount(server)
            .await;
    }
}

/// Mounts the cover and every page image with the same body.
pub async fn mount_images(server: &MockServer, chapters: usize, pages: usize, body: &[u8]) {
    mount_image(server, "/img/cover", body).await;
    for chapter in 1..=chapters {
        for page in 1..=pages {
            mount_image(server, &page_path(chapter, page), body).await;
        }
    }
}

pub async fn mount_image(server: &MockServer, image_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Base URL to hand to `HttpMetadataSource`.
pub fn api_base(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}
