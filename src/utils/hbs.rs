use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderErrorReason,
    Renderable,
};

/// Registra os helpers usados pelos templates .hbs
pub fn register_helpers(hb: &mut Handlebars) {
    hb.register_helper("formatDate", Box::new(format_date));
    hb.register_helper("truncate", Box::new(truncate));
    hb.register_helper("stripTags", Box::new(strip_tags));
    hb.register_helper("editIcon", Box::new(edit_icon));
    hb.register_helper("select", Box::new(Select));
}

/// {{formatDate created_at "%B %e, %Y"}} - formata Unix timestamp
fn format_date(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let ts = h
        .param(0)
        .and_then(|v| v.value().as_i64())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("formatDate", 0))?;
    let fmt = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%B %e, %Y");

    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(date) => out.write(&date.format(fmt).to_string())?,
        None => out.write(&ts.to_string())?,
    }
    Ok(())
}

/// {{truncate str len}} - corta no último espaço antes de len e anexa "..."
fn truncate(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("truncate", 0))?;
    let len = h
        .param(1)
        .and_then(|v| v.value().as_u64())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("truncate", 1))? as usize;

    out.write(&truncate_words(input, len))?;
    Ok(())
}

fn truncate_words(input: &str, len: usize) -> String {
    if input.chars().count() <= len {
        return input.to_string();
    }
    let cut: String = input.chars().take(len).collect();
    // Recua até o último espaço para não cortar palavra ao meio
    let trimmed = match cut.rfind(' ') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}...", trimmed)
}

/// {{stripTags html}} - remove marcação HTML para as prévias das listagens
fn strip_tags(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("stripTags", 0))?;

    out.write(&strip_html(input))?;
    Ok(())
}

fn strip_html(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// {{{editIcon story_user logged_user story_id}}} - link de edição só para o dono
fn edit_icon(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let story_user = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("editIcon", 0))?;
    let logged_user = h
        .param(1)
        .and_then(|v| v.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("editIcon", 1))?;
    let story_id = h
        .param(2)
        .and_then(|v| v.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("editIcon", 2))?;
    let floating = h
        .param(3)
        .and_then(|v| v.value().as_bool())
        .unwrap_or(true);

    if story_user == logged_user {
        if floating {
            out.write(&format!(
                "<a href=\"/stories/edit/{}\" class=\"btn-floating halfway-fab indigo\"><i class=\"fas fa-edit fa-small\"></i></a>",
                story_id
            ))?;
        } else {
            out.write(&format!(
                "<a href=\"/stories/edit/{}\"><i class=\"fas fa-edit\"></i></a>",
                story_id
            ))?;
        }
    }
    Ok(())
}

/// {{#select status}}<option ...>{{/select}} - marca a opção selecionada
///
/// Block helpers que renderizam o próprio template precisam implementar
/// `HelperDef` via struct (e não como função nua), pois o trait de função
/// não expressa a relação de lifetime `'reg: 'rc` exigida por `renders`.
struct Select;

impl HelperDef for Select {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let selected = h
            .param(0)
            .and_then(|v| v.value().as_str())
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("select", 0))?
            .to_string();
        let tmpl = h
            .template()
            .ok_or_else(|| RenderErrorReason::Other("select requires a block".to_string()))?;

        let options = tmpl.renders(r, ctx, rc)?;
        let needle = format!("value=\"{}\"", selected);
        let marked = options.replace(&needle, &format!("{} selected", needle));
        out.write(&marked)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Handlebars<'static> {
        let mut hb = Handlebars::new();
        register_helpers(&mut hb);
        hb
    }

    #[test]
    fn format_date_renders_unix_timestamp() {
        let hb = registry();
        let out = hb
            .render_template(
                "{{formatDate ts \"%Y-%m-%d\"}}",
                &json!({ "ts": 1700000000i64 }),
            )
            .unwrap();
        assert_eq!(out, "2023-11-14");
    }

    #[test]
    fn truncate_cuts_at_word_boundary() {
        assert_eq!(truncate_words("hello brave new world", 12), "hello brave...");
        assert_eq!(truncate_words("short", 12), "short");
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_html("<p>hello <b>world</b></p>"), "hello world");
        assert_eq!(strip_html("no tags"), "no tags");
    }

    #[test]
    fn edit_icon_only_for_owner() {
        let hb = registry();
        let owner = hb
            .render_template(
                "{{{editIcon story_user logged_user id}}}",
                &json!({ "story_user": "u1", "logged_user": "u1", "id": "abc" }),
            )
            .unwrap();
        assert!(owner.contains("/stories/edit/abc"));

        let other = hb
            .render_template(
                "{{{editIcon story_user logged_user id}}}",
                &json!({ "story_user": "u1", "logged_user": "u2", "id": "abc" }),
            )
            .unwrap();
        assert_eq!(other, "");
    }

    #[test]
    fn select_marks_matching_option() {
        let hb = registry();
        let out = hb
            .render_template(
                "{{#select status}}<option value=\"public\">Public</option><option value=\"private\">Private</option>{{/select}}",
                &json!({ "status": "private" }),
            )
            .unwrap();
        assert!(out.contains("value=\"private\" selected"));
        assert!(!out.contains("value=\"public\" selected"));
    }
}
