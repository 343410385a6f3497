//! Grouped HTML view of the structured sections.

use resolvekit_shared::{StructuredSections, escape_html as esc};

/// Sections in fixed order: header, methods, levels, documents, timeline,
/// note. Empty sections are left out.
pub(crate) fn grouped_view(sections: &StructuredSections) -> String {
    let mut out = String::from("<article class=\"complaint-guide\">");
    header(sections, &mut out);
    methods(sections, &mut out);
    levels(sections, &mut out);
    documents(sections, &mut out);
    timeline(sections, &mut out);
    note(sections, &mut out);
    out.push_str("</article>");
    out
}

fn header(sections: &StructuredSections, out: &mut String) {
    let heading = &sections.main_heading;
    if heading.title.is_empty() && heading.description.is_empty() {
        return;
    }
    out.push_str("<header>");
    if !heading.title.is_empty() {
        out.push_str(&format!("<h1>{}</h1>", esc(&heading.title)));
    }
    if !heading.description.is_empty() {
        out.push_str(&format!("<p>{}</p>", esc(&heading.description)));
    }
    out.push_str("</header>");
}

fn methods(sections: &StructuredSections, out: &mut String) {
    let section = &sections.complaint_methods;
    if section.methods.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<section class=\"complaint-methods\"><h2>{}</h2>",
        esc(&section.heading)
    ));
    for method in &section.methods {
        out.push_str(&format!(
            "<div class=\"complaint-method\" data-method=\"{}\"><h3>{}</h3>",
            method.method_number,
            esc(&method.title)
        ));
        if !method.description.is_empty() {
            out.push_str(&format!("<p>{}</p>", esc(&method.description)));
        }
        if !method.steps.is_empty() {
            out.push_str("<ol>");
            for step in &method.steps {
                out.push_str("<li>");
                if step.description.is_empty() {
                    out.push_str(&esc(&step.title));
                } else {
                    out.push_str(&format!(
                        "<strong>{}</strong>: {}",
                        esc(&step.title),
                        esc(&step.description)
                    ));
                }
                if !step.details.is_empty() {
                    out.push_str("<ul>");
                    for detail in &step.details {
                        out.push_str(&format!("<li>{}</li>", esc(detail)));
                    }
                    out.push_str("</ul>");
                }
                out.push_str("</li>");
            }
            out.push_str("</ol>");
        }
        contact(&method.contact_info, out);
        out.push_str("</div>");
    }
    out.push_str("</section>");
}

fn levels(sections: &StructuredSections, out: &mut String) {
    let section = &sections.escalation_levels;
    if section.levels.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<section class=\"escalation-levels\"><h2>{}</h2>",
        esc(&section.heading)
    ));
    for level in &section.levels {
        out.push_str(&format!(
            "<div class=\"escalation-level\" data-level=\"{}\"><h3>{}</h3>",
            level.level_number,
            esc(&level.title)
        ));
        if !level.description.is_empty() {
            out.push_str(&format!("<p>{}</p>", esc(&level.description)));
        }
        contact(&level.contact_details, out);
        out.push_str("</div>");
    }
    out.push_str("</section>");
}

fn documents(sections: &StructuredSections, out: &mut String) {
    let section = &sections.documents_required;
    if section.documents.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<section class=\"documents-required\"><h2>{}</h2><ul>",
        esc(&section.heading)
    ));
    for doc in &section.documents {
        out.push_str(&format!("<li>{}</li>", esc(doc)));
    }
    out.push_str("</ul></section>");
}

fn timeline(sections: &StructuredSections, out: &mut String) {
    let section = &sections.resolution_timeline;
    if section.timelines.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<section class=\"resolution-timeline\"><h2>{}</h2><ul>",
        esc(&section.heading)
    ));
    for entry in &section.timelines {
        out.push_str(&format!(
            "<li><strong>{}</strong> ({} days): {}</li>",
            esc(&entry.level),
            esc(&entry.days),
            esc(&entry.description)
        ));
    }
    out.push_str("</ul></section>");
}

fn note(sections: &StructuredSections, out: &mut String) {
    if sections.note.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<aside class=\"complaint-note\"><p>{}</p></aside>",
        esc(&sections.note)
    ));
}

fn contact(details: &str, out: &mut String) {
    if !details.is_empty() {
        out.push_str(&format!(
            "<p class=\"contact\"><em>Contact:</em> {}</p>",
            esc(details)
        ));
    }
}
