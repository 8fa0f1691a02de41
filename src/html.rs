// ABOUTME: HTML generation module for the bitacora site
// ABOUTME: Renders the landing page, the carousel page shell and the live carousel fragment

use crate::carousel::CarouselView;
use crate::config::CarouselSettings;
use crate::expansion::Expansion;
use crate::navigator::Direction;
use crate::resources::{PageResources, CAROUSEL_CSS, CAROUSEL_JS};
use crate::talks::{QuestionAnswer, Talk};
use quick_xml::escape::escape;
use std::fmt::Write;

const SITE_TITLE: &str = "Bitácora";
const CREDITS: &str = "Lucas Garbate, Milena Parysaw, Rocio Casares";

fn document_head(title: &str, resources: &PageResources, extra: &str) -> String {
    let mut html_doc = String::from("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n");
    html_doc.push_str("<meta charset=\"UTF-8\">\n");
    html_doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html_doc.push_str(extra);
    let _ = writeln!(html_doc, "<title>{}</title>", escape(title));
    let _ = writeln!(
        html_doc,
        r#"<link rel="stylesheet" href="/assets/{}">"#,
        CAROUSEL_CSS.name
    );
    html_doc.push_str(resources.head());
    html_doc.push_str("</head>\n");
    html_doc
}

/// Landing page that moves on to the carousel after the landing delay
pub fn render_landing(settings: &CarouselSettings, resources: &PageResources) -> String {
    let refresh = format!(
        "<meta http-equiv=\"refresh\" content=\"{};url=/charlas\">\n",
        settings.landing_delay.as_secs()
    );
    let mut html_doc = document_head(SITE_TITLE, resources, &refresh);

    html_doc.push_str("<body class=\"landing\">\n<div class=\"landing-title\">\n");
    let _ = writeln!(html_doc, "<h1>{}</h1>", escape(SITE_TITLE));
    html_doc.push_str("<div class=\"landing-underline\"></div>\n");
    html_doc.push_str("<p>Cargando experiencias...</p>\n</div>\n");
    html_doc.push_str(
        "<div class=\"landing-dots\"><span></span><span></span><span></span></div>\n",
    );
    let _ = writeln!(
        html_doc,
        "<p class=\"credits\">Hecho por {}</p>",
        escape(CREDITS)
    );
    html_doc.push_str("</body>\n</html>");
    html_doc
}

/// Full carousel page: the current fragment plus the script that opens the live channel
pub fn render_carousel_page(
    view: &CarouselView,
    live_port: u16,
    resources: &PageResources,
) -> String {
    let mut html_doc = document_head(SITE_TITLE, resources, "");
    html_doc.push_str("<body class=\"charlas\">\n");
    let _ = writeln!(
        html_doc,
        r#"<main id="carousel-root" data-live-port="{}">"#,
        live_port
    );
    html_doc.push_str(&render_carousel(view));
    html_doc.push_str("\n</main>\n");
    let _ = writeln!(html_doc, "<p class=\"credits fixed\">{}</p>", escape(CREDITS));
    let _ = writeln!(
        html_doc,
        r#"<script src="/assets/{}"></script>"#,
        CAROUSEL_JS.name
    );
    html_doc.push_str("</body>\n</html>");
    html_doc
}

/// The carousel itself, as pushed to the browser on every change
pub fn render_carousel(view: &CarouselView) -> String {
    let nav = view.navigation();
    let disabled = if nav.transition_lock { " disabled" } else { "" };
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<div class="carousel" data-index="{}" data-count="{}">"#,
        nav.current_index,
        view.catalog().len()
    );

    // Header with home link and thumbnails
    out.push_str(r#"<header class="thumbs-bar">"#);
    out.push_str(r#"<a class="home" href="/" aria-label="Volver al inicio">&#8962;</a>"#);
    out.push_str(r#"<nav class="thumbs">"#);
    for (index, talk) in view.catalog().talks().iter().enumerate() {
        let current = index == nav.current_index;
        let _ = write!(
            out,
            r#"<button class="thumb{}" data-action="select_slide" data-index="{}"{}>"#,
            if current { " current" } else { "" },
            index,
            disabled
        );
        let _ = write!(out, r#"<span class="thumb-number">{:02}</span>"#, index + 1);
        if current {
            let _ = write!(out, r#"<span class="thumb-title">{}</span>"#, escape(&talk.title));
        }
        out.push_str("</button>");
    }
    out.push_str("</nav></header>");

    // Fixed navigation arrows
    let _ = write!(
        out,
        r#"<button class="arrow prev" data-action="previous" aria-label="Anterior"{}>&#8249;</button>"#,
        disabled
    );
    let _ = write!(
        out,
        r#"<button class="arrow next" data-action="next" aria-label="Siguiente"{}>&#8250;</button>"#,
        disabled
    );

    let animation = match nav.direction {
        Some(Direction::Forward) => "slide-out-left",
        Some(Direction::Backward) => "slide-out-right",
        None => "slide-in",
    };
    let _ = write!(out, r#"<section class="slide {}" data-swipe>"#, animation);

    let talk = view.current_talk();
    let _ = write!(
        out,
        r#"<h2 class="slide-title">{}</h2><div class="rule"></div>"#,
        escape(&talk.title)
    );

    match view.expansion() {
        Expansion::Description => {
            out.push_str(r#"<div class="expanded">"#);
            render_description(&mut out, talk, true);
            out.push_str("</div>");
        }
        Expansion::Questions => {
            out.push_str(r#"<div class="expanded">"#);
            render_questions(&mut out, &talk.questions_and_answers, true);
            out.push_str("</div>");
        }
        Expansion::None => {
            out.push_str(r#"<div class="grid"><div class="column">"#);
            render_description(&mut out, talk, false);
            render_reflection(&mut out, talk);
            out.push_str(r#"</div><div class="column">"#);
            render_questions(&mut out, &talk.questions_and_answers, false);
            render_links(&mut out, talk);
            render_images(&mut out, view);
            out.push_str("</div></div>");
        }
    }

    out.push_str("</section></div>");
    out
}

fn panel_heading(out: &mut String, label: &str, action: &str, expanded: bool) {
    let (toggle_action, toggle_label) = if expanded {
        ("collapse", "Cerrar")
    } else {
        (action, "Ver todo")
    };
    let _ = write!(
        out,
        r#"<h3>{}<button class="toggle" data-action="{}">{}</button></h3>"#,
        label, toggle_action, toggle_label
    );
}

fn render_description(out: &mut String, talk: &Talk, expanded: bool) {
    out.push_str(r#"<div class="panel description">"#);
    panel_heading(out, "Descripción", "toggle_description", expanded);
    let _ = write!(out, "<p>{}</p>", escape(&talk.description));
    out.push_str("</div>");
}

fn render_reflection(out: &mut String, talk: &Talk) {
    out.push_str(r#"<div class="panel reflection"><h3>Reflexión</h3>"#);
    match &talk.reflection {
        Some(reflection) => {
            let _ = write!(out, r#"<p class="quote">{}</p>"#, escape(reflection));
        }
        None => out.push_str(r#"<p class="placeholder">Sin reflexión registrada</p>"#),
    }
    out.push_str("</div>");
}

fn render_questions(out: &mut String, questions: &[QuestionAnswer], expanded: bool) {
    out.push_str(r#"<div class="panel questions">"#);
    panel_heading(out, "Preguntas", "toggle_questions", expanded);
    if questions.is_empty() {
        out.push_str(r#"<p class="placeholder">Sin preguntas registradas</p>"#);
    } else {
        out.push_str("<ul>");
        for qa in questions {
            let _ = write!(out, r#"<li><span class="question">{}</span>"#, escape(&qa.question));
            if !qa.answer.is_empty() {
                let _ = write!(out, r#"<span class="answer">{}</span>"#, escape(&qa.answer));
            }
            out.push_str("</li>");
        }
        out.push_str("</ul>");
    }
    out.push_str("</div>");
}

fn render_links(out: &mut String, talk: &Talk) {
    out.push_str(r#"<div class="panel links">"#);
    if talk.has_links() {
        let links = [
            ("linkedin", "LinkedIn", &talk.linkedin),
            ("instagram", "Instagram", &talk.instagram),
            ("website", "Sitio web", &talk.website),
        ];
        for (class, label, href) in links {
            if let Some(href) = href {
                let _ = write!(
                    out,
                    r#"<a class="social {}" href="{}" target="_blank" rel="noopener noreferrer" title="{}">{}</a>"#,
                    class,
                    escape(href.as_str()),
                    label,
                    label
                );
            }
        }
    } else {
        out.push_str(r#"<p class="placeholder">Sin enlaces</p>"#);
    }
    out.push_str("</div>");
}

fn render_images(out: &mut String, view: &CarouselView) {
    out.push_str(r#"<div class="panel images">"#);
    match view.current_image() {
        Some(src) if view.is_broken(src) => {
            out.push_str(r#"<p class="placeholder">Imagen no disponible</p>"#);
        }
        Some(src) => {
            let _ = write!(
                out,
                r#"<img src="{}" alt="{}" data-image>"#,
                escape(src),
                escape(&view.current_talk().title)
            );
        }
        None if view.is_loading_images() => {
            out.push_str(r#"<p class="placeholder">Cargando imágenes...</p>"#);
        }
        None => out.push_str(r#"<p class="placeholder">Sin imágenes</p>"#),
    }

    if view.images().len() > 1 {
        out.push_str(r#"<div class="dots">"#);
        for index in 0..view.images().len() {
            let _ = write!(
                out,
                r#"<button class="dot{}" data-action="select_image" data-index="{}"></button>"#,
                if index == view.image_index() { " current" } else { "" },
                index
            );
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
}
