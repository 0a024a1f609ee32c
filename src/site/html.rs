//! Templates for the generated pages.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::library::TrackRecord;

/// Turn a relative site path into an absolute, percent-encoded URL.
pub(super) fn href(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(&urlencoding::encode(segment));
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

pub(super) fn playback_page(track: &TrackRecord, index_href: &str) -> String {
    let title = encode_text(&track.title);
    let album = encode_text(&track.album_title);
    let album_attr = encode_double_quoted_attribute(&track.album_title);
    let artwork = href(&track.artwork_path);
    let audio = href(&track.audio_path);

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
  </head>
  <body>
    <h2>{title}</h2>
    <h3>{album}</h3>
    <img src="{artwork}" alt="{album_attr}">
    <p>
      <audio controls>
        <source src="{audio}" type="audio/mpeg">
        Your browser does not support HTML5 audio.
      </audio>
    </p>
    <p>
      <a href="{index_href}">Return to Library</a>
    </p>
  </body>
</html>
"#
    )
}

pub(super) fn index_page(catalog: &[TrackRecord]) -> String {
    let mut rows = String::new();
    for track in catalog {
        // writing into a String cannot fail
        let _ = write!(
            rows,
            r#"
        <tr>
          <td><img src="{}" alt="" width="64" height="64"></td>
          <td>{}</td>
          <td>{}</td>
          <td>{}s</td>
          <td><a href="{}">Play</a></td>
        </tr>"#,
            href(&track.artwork_path),
            encode_text(&track.title),
            encode_text(&track.album_title),
            encode_text(&track.length_seconds),
            href(&track.page_path),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Library</title>
  </head>
  <body>
    <table>
      <tbody>{rows}
      </tbody>
    </table>
  </body>
</html>
"#
    )
}
