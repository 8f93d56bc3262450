//! HTML views
//!
//! Every view is a pure function of the application context (plus the form
//! state for the prediction view) returning a complete HTML page.

use std::fmt::Write as _;

use beasiswa_classifier::Prediction;
use beasiswa_dataset::schema::{
    IPK_RANGE, IPK_STEP, ORGANISASI_CHOICES, PENGHASILAN_CHOICES, PRESTASI_CHOICES,
    TANGGUNGAN_RANGE,
};
use beasiswa_dataset::{ApplicantFeatures, POSITIVE_LABEL};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::context::AppContext;

pub const PAGE_TITLE: &str = "Sistem Pendukung Keputusan Beasiswa Mahasiswa";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Description,
    Data,
    Prediction,
    About,
}

impl View {
    pub const MENU: [View; 4] = [View::Description, View::Data, View::Prediction, View::About];

    pub fn path(self) -> &'static str {
        match self {
            View::Description => "/",
            View::Data => "/data",
            View::Prediction => "/prediksi",
            View::About => "/tentang",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Description => "Deskripsi Sistem",
            View::Data => "Lihat Data",
            View::Prediction => "Prediksi Kelayakan",
            View::About => "Tentang Pembuat",
        }
    }
}

/// Outcome of a submitted prediction form
#[derive(Clone, Debug)]
pub enum FormOutcome {
    Predicted(Prediction),
    Rejected(String),
}

/// Probability in [0, 1] as a percentage with two decimals
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; color: #262730; }
nav { width: 14rem; min-height: 100vh; background: #f0f2f6; padding: 1.5rem 1rem; }
nav a { display: block; padding: .4rem .6rem; color: inherit; text-decoration: none; border-radius: .3rem; }
nav a.active { background: #ff4b4b; color: #fff; }
main { flex: 1; padding: 1.5rem 2.5rem; max-width: 60rem; }
table { border-collapse: collapse; font-size: .9rem; }
th, td { border: 1px solid #ddd; padding: .25rem .6rem; text-align: left; }
.bar-row { display: flex; align-items: center; margin: .3rem 0; }
.bar-label { width: 8rem; }
.bar { background: #1f77b4; height: 1.4rem; margin-right: .5rem; }
.success { background: #d4edda; padding: .8rem; border-radius: .3rem; }
.error { background: #f8d7da; padding: .8rem; border-radius: .3rem; }
.warning { background: #fff3cd; padding: .8rem; border-radius: .3rem; }
.columns { display: flex; gap: 2rem; }
.columns > div { flex: 1; }
label { display: block; margin-top: .8rem; }
"#;

fn layout(active: View, body: &str) -> String {
    let mut menu = String::new();
    for view in View::MENU {
        let class = if view == active { " class=\"active\"" } else { "" };
        let _ = writeln!(
            menu,
            "<a href=\"{}\"{}>{}</a>",
            view.path(),
            class,
            view.label()
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<nav>
<h3>Menu</h3>
{menu}</nav>
<main>
<h1>{title}</h1>
<p>Metode: <strong>Klasifikasi (Decision Tree)</strong></p>
<p>Aplikasi ini membantu menentukan kelayakan calon penerima beasiswa berdasarkan data akademik dan ekonomi.</p>
<h2>{heading}</h2>
{body}
</main>
</body>
</html>
"#,
        title = PAGE_TITLE,
        style = STYLE,
        menu = menu,
        heading = active.label(),
        body = body,
    )
}

pub fn description(ctx: &AppContext) -> String {
    let body = format!(
        r#"<p><strong>Tujuan:</strong><br>
Membantu pihak kampus/instansi dalam mengambil keputusan kelayakan penerima beasiswa.</p>
<p><strong>Input yang digunakan:</strong></p>
<ul>
<li>IPK</li>
<li>Penghasilan Orang Tua</li>
<li>Jumlah Tanggungan</li>
<li>Keaktifan Organisasi</li>
<li>Prestasi Akademik / Non-Akademik</li>
</ul>
<p><strong>Metode:</strong></p>
<ul>
<li>Menggunakan <em>Decision Tree Classifier</em></li>
<li>Fitur kategorikal diproses dengan <em>OneHotEncoder</em></li>
<li>Data dibagi menjadi data latih dan data uji (80:20)</li>
</ul>
<p><strong>Performa Model:</strong></p>
<ul>
<li>Akurasi pada data uji: <strong>{accuracy}</strong></li>
</ul>
"#,
        accuracy = format_percent(ctx.model().accuracy)
    );
    layout(View::Description, &body)
}

pub fn data(ctx: &AppContext) -> String {
    let dataset = ctx.dataset();
    let mut body = String::from("<h3>Data Beasiswa</h3>\n<table>\n<thead><tr><th></th>");

    for header in dataset.headers() {
        let _ = write!(body, "<th>{}</th>", encode_text(header));
    }
    body.push_str("</tr></thead>\n<tbody>\n");

    for (i, row) in dataset.rows().iter().enumerate() {
        let _ = write!(body, "<tr><td>{i}</td>");
        for cell in row {
            let _ = write!(body, "<td>{}</td>", encode_text(cell));
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</tbody>\n</table>\n");

    let _ = write!(
        body,
        "<p>Jumlah data: {}</p>\n<p>Jumlah fitur: {}</p>\n",
        dataset.row_count(),
        dataset.feature_count()
    );

    body.push_str("<table>\n<tr><th>Kolom</th><th>Min</th><th>Maks</th><th>Rata-rata</th></tr>\n");
    for stats in dataset.numeric_stats() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            stats.column, stats.min, stats.max, stats.mean
        );
    }
    body.push_str("</table>\n");

    body.push_str("<p><strong>Distribusi Kelas Kelayakan:</strong></p>\n<div class=\"chart\">\n");
    let counts = dataset.label_counts();
    let largest = counts.values().copied().max().unwrap_or(0).max(1);
    for (label, count) in &counts {
        let width = *count as f64 / largest as f64 * 100.0;
        let _ = writeln!(
            body,
            "<div class=\"bar-row\"><span class=\"bar-label\">{}</span><div class=\"bar\" style=\"width: {:.1}%\"></div><span>{}</span></div>",
            encode_text(label),
            width,
            count
        );
    }
    body.push_str("</div>\n");

    layout(View::Data, &body)
}

fn select(name: &str, label: &str, choices: &[&str], selected: &str) -> String {
    let mut html = format!("<label for=\"{name}\">{label}</label>\n<select id=\"{name}\" name=\"{name}\">\n");
    let mut matched = false;
    for choice in choices {
        let attr = if *choice == selected {
            matched = true;
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            encode_double_quoted_attribute(choice),
            attr,
            encode_text(choice)
        );
    }
    // Keep a submitted value that is not one of the offered choices.
    if !matched {
        let _ = writeln!(
            html,
            "<option value=\"{}\" selected>{}</option>",
            encode_double_quoted_attribute(selected),
            encode_text(selected)
        );
    }
    html.push_str("</select>\n");
    html
}

pub fn prediction(form: &ApplicantFeatures, outcome: Option<&FormOutcome>) -> String {
    let mut body = String::from("<h3>Input Data Calon Penerima Beasiswa</h3>\n");
    body.push_str("<form method=\"post\" action=\"/prediksi\">\n<div class=\"columns\">\n<div>\n");

    let _ = write!(
        body,
        r#"<label for="IPK">IPK: <output id="ipk-value">{ipk:.2}</output></label>
<input type="range" id="IPK" name="IPK" min="{min:.2}" max="{max:.2}" step="{step}" value="{ipk:.2}" oninput="document.getElementById('ipk-value').value = Number(this.value).toFixed(2)">
"#,
        ipk = form.ipk,
        min = IPK_RANGE.start(),
        max = IPK_RANGE.end(),
        step = IPK_STEP,
    );
    body.push_str(&select(
        "Penghasilan_Ortu",
        "Penghasilan Orang Tua (per bulan)",
        &PENGHASILAN_CHOICES,
        &form.penghasilan_ortu,
    ));
    let _ = write!(
        body,
        r#"<label for="Jumlah_Tanggungan">Jumlah Tanggungan Keluarga: <output id="tanggungan-value">{deps}</output></label>
<input type="range" id="Jumlah_Tanggungan" name="Jumlah_Tanggungan" min="{min}" max="{max}" step="1" value="{deps}" oninput="document.getElementById('tanggungan-value').value = this.value">
"#,
        deps = form.jumlah_tanggungan,
        min = TANGGUNGAN_RANGE.start(),
        max = TANGGUNGAN_RANGE.end(),
    );

    body.push_str("</div>\n<div>\n");
    body.push_str(&select(
        "Organisasi",
        "Keaktifan Organisasi",
        &ORGANISASI_CHOICES,
        &form.organisasi,
    ));
    body.push_str(&select(
        "Prestasi",
        "Prestasi",
        &PRESTASI_CHOICES,
        &form.prestasi,
    ));
    body.push_str("</div>\n</div>\n<p><button type=\"submit\">Prediksi Kelayakan</button></p>\n</form>\n");

    match outcome {
        Some(FormOutcome::Predicted(prediction)) => body.push_str(&prediction_result(prediction)),
        Some(FormOutcome::Rejected(message)) => {
            let _ = writeln!(body, "<div class=\"error\">{}</div>", encode_text(message));
        }
        None => {}
    }

    layout(View::Prediction, &body)
}

fn prediction_result(prediction: &Prediction) -> String {
    let mut html = String::from("<h3>Hasil Prediksi</h3>\n");

    if prediction.is_label(POSITIVE_LABEL) {
        html.push_str(
            "<div class=\"success\">Calon penerima <strong>LAYAK</strong> mendapatkan beasiswa.</div>\n",
        );
    } else {
        html.push_str(
            "<div class=\"error\">Calon penerima <strong>TIDAK LAYAK</strong> mendapatkan beasiswa.</div>\n",
        );
    }

    if !prediction.unknown_categories.is_empty() {
        html.push_str("<div class=\"warning\">Nilai kategori berikut tidak dikenal oleh model dan diabaikan:<ul>\n");
        for unknown in &prediction.unknown_categories {
            let _ = writeln!(
                html,
                "<li>{}: {}</li>",
                encode_text(&unknown.column),
                encode_text(&unknown.value)
            );
        }
        html.push_str("</ul></div>\n");
    }

    html.push_str("<h3>Probabilitas Prediksi</h3>\n<table>\n");
    for class in &prediction.probabilities {
        let _ = writeln!(
            html,
            "<tr><th>{}</th><td>{}</td></tr>",
            encode_text(&class.label),
            format_percent(class.probability)
        );
    }
    html.push_str("</table>\n");
    html
}

pub fn about() -> String {
    let body = r#"<p>Nama: Isi dengan nama kamu</p>
<p>NIM: Isi dengan NIM kamu</p>
<p>Mata Kuliah: Sistem Pendukung Keputusan</p>
<p>Metode: Klasifikasi - Decision Tree</p>
<p>Silakan sesuaikan bagian ini dengan identitasmu sebelum pengumpulan tugas.</p>
"#;
    layout(View::About, body)
}
