//! The standard tag catalog.
//!
//! Every custom tag the engine understands is registered here. Tags not in
//! the table render as passthrough markup.

use tracing::debug;

use crate::attributes::Attributes;
use crate::config::RenderConfig;
use crate::dispatch::{
    close_fn, decorate, div_end, div_start, element_close, element_open, open_fn, Decoration,
    Handler, HandlerTable, Step,
};
use crate::error::RenderResult;
use crate::inheritance;
use crate::renderer::Renderer;
use crate::stacks::{list_tag, AccordionFrame, NavFrame, SectionFrame};

fn open<F>(f: F) -> Handler
where
    F: Fn(&mut Renderer<'_, '_>, Attributes) -> RenderResult<Option<String>> + Send + Sync + 'static,
{
    Handler::open(open_fn(f))
}

fn close<F>(f: F) -> Handler
where
    F: Fn(&mut Renderer<'_, '_>) -> RenderResult<Option<String>> + Send + Sync + 'static,
{
    Handler::close(close_fn(f))
}

/// Build the handler table for every built-in tag.
pub fn standard_table(config: &RenderConfig) -> HandlerTable {
    let favicon_href = config.favicon_href.clone();
    let analytics_script = config.analytics_script.clone();

    HandlerTable::new()
        // head
        .on_start_end("description", meta("description"))
        .on_start_end("keywords", meta("keywords"))
        .on_start_end("viewport", open(viewport))
        .on_start_end("stylesheet", open(stylesheet))
        .on_start_end("extscript", open(|r, attrs| Ok(Some(extscript(r, attrs)))))
        .on_start_end(
            "favicon",
            open(move |r, attrs| {
                let attrs = Attributes::with_defaults(
                    &[
                        ("href", favicon_href.as_str()),
                        ("rel", "icon"),
                        ("type", "image/png"),
                    ],
                    attrs,
                );
                Ok(Some(r.make_tag_start_end("link", &attrs)))
            }),
        )
        .on_start_end(
            "analytics",
            open(move |r, _| {
                let root = r.make_tag_start("div", &Attributes::from_pairs([("id", "fb-root")]));
                let script = extscript(r, Attributes::from_pairs([("src", analytics_script.as_str())]));
                Ok(Some(format!("{}{}{}", root, r.make_tag_end("div"), script)))
            }),
        )
        .on_start_end("title", open(title))
        // layout
        .on_pair("wrapper", div_start(Decoration::new().id("wrapper")), div_end())
        .on_pair("preamble", div_start(Decoration::new().id("preamble")), div_end())
        .on_pair("hero", div_start(Decoration::new().class("hero")), div_end())
        .on_pair("row", div_start(Decoration::new().class("row")), div_end())
        .on_pair("rows", div_start(Decoration::new().class("rows")), div_end())
        .on_pair("column", div_start(Decoration::new().class("column")), div_end())
        .on_pair(
            "columns",
            div_start(Decoration::new().class("columns").compound("{size}-{count}")),
            div_end(),
        )
        .on_pair("literalblock", div_start(Decoration::new().class("literalblock")), div_end())
        .on_pair("content", div_start(Decoration::new().class("content")), div_end())
        .on_pair("image-block", div_start(Decoration::new().class("imageblock")), div_end())
        .on_pair(
            "paragraph",
            Handler::composite(vec![
                Step::Open(decorate(Decoration::new().class("paragraph"), element_open("div"))),
                Step::Open(element_open("p")),
            ]),
            Handler::composite(vec![
                Step::Close(element_close("p")),
                Step::Close(element_close("div")),
            ]),
        )
        .on_pair(
            "arabic",
            Handler::composite(vec![
                Step::Open(decorate(
                    Decoration::new().class("olist").class("arabic"),
                    element_open("div"),
                )),
                Step::Open(element_open("ol")),
            ]),
            Handler::composite(vec![
                Step::Close(element_close("ol")),
                Step::Close(element_close("div")),
            ]),
        )
        .on_start_end(
            "top",
            Handler::composite(vec![
                Step::Open(decorate(Decoration::new().id("top"), element_open("div"))),
                Step::Close(element_close("div")),
            ]),
        )
        .on_pair("section", open(section_start), close(section_end))
        .on_pair("accordion", open(accordion_start), close(accordion_end))
        // navigation
        .on_pair("nav", open(nav_start), close(nav_end))
        .on_pair("navlink", open(navlink_start), close(|_| Ok(Some("</a></li>".to_string()))))
        .on_start_end("menu-toggle", open(|r, _| Ok(Some(menu_toggle(r)))))
        .on_start("a", open(|r, attrs| Ok(Some(r.make_a_start(attrs)))))
        .on_pair(
            "pdf-link",
            Handler::open(decorate(
                Decoration::new().class("pdf"),
                open_fn(|r, attrs| Ok(Some(r.make_a_start(attrs)))),
            )),
            Handler::close(element_close("a")),
        )
        // code
        .on_pair("code", open(code_start), close(|r| r.end_code("code").map(Some)))
        .on_pair("pre", open(code_start), close(|r| r.end_code("pre").map(Some)))
        // composition
        .on_start_end("set", open(set))
        .on_start_end("include", open(include))
        .on_start_end("header", includer(config.header_include.clone()))
        .on_start_end("footer", includer(config.footer_include.clone()))
        .on_pair(
            "block",
            inheritance::block_capture_start(),
            inheritance::block_capture_end(),
        )
        .on_start_end("block", inheritance::block_replay())
        .on_pair("extends", inheritance::extends_start(), inheritance::extends_end())
}

/// `<meta name=...>` with `name` placed first.
fn meta(name: &'static str) -> Handler {
    open(move |r, attrs| {
        let attrs = Attributes::with_defaults(&[("name", name)], attrs);
        Ok(Some(r.make_tag_start_end("meta", &attrs)))
    })
}

fn viewport(r: &mut Renderer<'_, '_>, attrs: Attributes) -> RenderResult<Option<String>> {
    let attrs = Attributes::with_defaults(
        &[("width", "device-width"), ("initial-scale", "1.0")],
        attrs,
    );
    let content = format!(
        "width={}, initial-scale={}",
        attrs.get("width").unwrap_or_default(),
        attrs.get("initial-scale").unwrap_or_default()
    );
    let meta = Attributes::from_pairs([("name", "viewport"), ("content", content.as_str())]);
    Ok(Some(r.make_tag_start_end("meta", &meta)))
}

fn stylesheet(r: &mut Renderer<'_, '_>, attrs: Attributes) -> RenderResult<Option<String>> {
    let attrs = Attributes::with_defaults(
        &[("rel", "stylesheet"), ("type", "text/css"), ("media", "all")],
        attrs,
    );
    Ok(Some(r.make_tag_start_end("link", &attrs)))
}

fn extscript(r: &Renderer<'_, '_>, attrs: Attributes) -> String {
    let attrs = Attributes::with_defaults(&[("type", "text/javascript")], attrs);
    format!("{}{}", r.make_tag_start("script", &attrs), r.make_tag_end("script"))
}

fn title(r: &mut Renderer<'_, '_>, _attrs: Attributes) -> RenderResult<Option<String>> {
    Ok(Some(format!(
        "<title>{}</title>",
        r.context().value("title")
    )))
}

fn section_start(r: &mut Renderer<'_, '_>, mut attrs: Attributes) -> RenderResult<Option<String>> {
    let frame = SectionFrame {
        section_type: attrs.get("type").unwrap_or_default().to_string(),
    };
    attrs.remove("type");
    if let Some(class_name) = frame.class_name() {
        attrs.add_class(class_name);
    }
    r.stacks_mut().sections.push(frame);
    Ok(Some(r.make_tag_start("section", &attrs)))
}

fn section_end(r: &mut Renderer<'_, '_>) -> RenderResult<Option<String>> {
    r.stacks_mut().sections.pop()?;
    Ok(Some(r.make_tag_end("section")))
}

fn accordion_start(r: &mut Renderer<'_, '_>, mut attrs: Attributes) -> RenderResult<Option<String>> {
    attrs.add_class("accordion");
    let tag = list_tag(attrs.get("type").unwrap_or_default());
    attrs.remove("type");
    r.stacks_mut().accordions.push(AccordionFrame { list_tag: tag });
    Ok(Some(r.make_tag_start(tag, &attrs)))
}

fn accordion_end(r: &mut Renderer<'_, '_>) -> RenderResult<Option<String>> {
    let frame = r.stacks_mut().accordions.pop()?;
    Ok(Some(r.make_tag_end(frame.list_tag)))
}

fn nav_start(r: &mut Renderer<'_, '_>, mut attrs: Attributes) -> RenderResult<Option<String>> {
    let frame = NavFrame {
        attrs: attrs.clone(),
    };
    let element = frame.element();
    r.stacks_mut().navs.push(frame);
    if element == "ul" {
        attrs.remove("sub");
        attrs.add_class("sub-nav");
    }
    Ok(Some(r.make_tag_start(element, &attrs)))
}

fn nav_end(r: &mut Renderer<'_, '_>) -> RenderResult<Option<String>> {
    let frame = r.stacks_mut().navs.pop()?;
    Ok(Some(r.make_tag_end(frame.element())))
}

fn navlink_start(r: &mut Renderer<'_, '_>, attrs: Attributes) -> RenderResult<Option<String>> {
    let attrs = Attributes::with_defaults(&[("class", "")], attrs);
    let item = r.make_tag_start("li", &attrs.pick(&["class", "id", "style"]));
    let link = r.make_a_start(attrs.pick(&["href", "target", "new-tab"]));
    Ok(Some(format!("{}{}", item, link)))
}

fn menu_toggle(r: &Renderer<'_, '_>) -> String {
    let item = Attributes::from_pairs([("class", "toggle-topbar menu-icon")]);
    let link = Attributes::from_pairs([("href", "#")]);
    format!(
        "{}{}<span>Menu</span>{}{}",
        r.make_tag_start("li", &item),
        r.make_tag_start("a", &link),
        r.make_tag_end("a"),
        r.make_tag_end("li")
    )
}

fn code_start(r: &mut Renderer<'_, '_>, attrs: Attributes) -> RenderResult<Option<String>> {
    r.begin_code(attrs);
    Ok(None)
}

/// Store each attribute, substituted, as a context variable.
fn set(r: &mut Renderer<'_, '_>, attrs: Attributes) -> RenderResult<Option<String>> {
    for (name, value) in attrs.iter() {
        let value = r.populate(value.unwrap_or_default());
        debug!("set {} = {:?}", name, value);
        r.context_mut().set(name, value);
    }
    Ok(None)
}

fn include(r: &mut Renderer<'_, '_>, attrs: Attributes) -> RenderResult<Option<String>> {
    let src = Renderer::require("include", &attrs, "src")?;
    r.include(src)?;
    Ok(None)
}

/// Self-closing tag that splices in a fixed template.
fn includer(reference: String) -> Handler {
    open(move |r, _| {
        r.include(&reference)?;
        Ok(None)
    })
}

#[cfg(test)]
mod tests {
    use crate::config::RenderConfig;
    use crate::context::Context;
    use crate::engine::Engine;
    use crate::error::RenderError;
    use crate::stacks::FrameKind;

    fn render(source: &str) -> String {
        render_with(source, &mut Context::new())
    }

    fn render_with(source: &str, context: &mut Context) -> String {
        let engine = Engine::new(RenderConfig::default().include_env(false)).unwrap();
        engine.render_str(source, context).unwrap()
    }

    fn render_err(source: &str) -> RenderError {
        let engine = Engine::new(RenderConfig::default().include_env(false)).unwrap();
        engine.render_str(source, &mut Context::new()).unwrap_err()
    }

    #[test]
    fn test_meta_name_first() {
        assert_eq!(
            render("<description content=\"A site\" />"),
            "<meta name=\"description\" content=\"A site\" />\n"
        );
    }

    #[test]
    fn test_stylesheet_defaults_then_attrs() {
        assert_eq!(
            render("<stylesheet href=\"/s.css\" media=\"print\" />"),
            "<link rel=\"stylesheet\" type=\"text/css\" media=\"print\" href=\"/s.css\" />\n"
        );
    }

    #[test]
    fn test_extscript() {
        assert_eq!(
            render("<extscript src=\"/app.js\" />"),
            "<script type=\"text/javascript\" src=\"/app.js\"></script>\n"
        );
    }

    #[test]
    fn test_favicon_uses_configured_href() {
        assert_eq!(
            render("<favicon />"),
            "<link href=\"/dashboard/images/favicon.png\" rel=\"icon\" type=\"image/png\" />\n"
        );
    }

    #[test]
    fn test_analytics() {
        assert_eq!(
            render("<analytics />"),
            "<div id=\"fb-root\"></div><script type=\"text/javascript\" \
             src=\"/dashboard/javascripts/fb_insert.js\"></script>\n"
        );
    }

    #[test]
    fn test_viewport_defaults() {
        assert_eq!(
            render("<viewport />"),
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n"
        );
        assert_eq!(
            render("<viewport width=\"320\" />"),
            "<meta name=\"viewport\" content=\"width=320, initial-scale=1.0\" />\n"
        );
    }

    #[test]
    fn test_title_from_context() {
        let mut context = Context::from_pairs([("title", "Home")]);
        assert_eq!(render_with("<title />", &mut context), "<title>Home</title>\n");
        assert_eq!(render("<title />"), "<title></title>\n");
    }

    #[test]
    fn test_decorated_divs() {
        assert_eq!(render("<hero></hero>"), "<div class=\"hero\">\n</div>\n");
        assert_eq!(render("<wrapper></wrapper>"), "<div id=\"wrapper\">\n</div>\n");
        assert_eq!(
            render("<image-block></image-block>"),
            "<div class=\"imageblock\">\n</div>\n"
        );
        assert_eq!(
            render("<columns size=\"large\" count=\"6\"></columns>"),
            "<div size=\"large\" count=\"6\" class=\"columns large-6\">\n</div>\n"
        );
    }

    #[test]
    fn test_paragraph_composite() {
        assert_eq!(
            render("<paragraph>Hi</paragraph>"),
            "<div class=\"paragraph\"> <p>\nHi\n</p> </div>\n"
        );
    }

    #[test]
    fn test_arabic_composite() {
        assert_eq!(
            render("<arabic></arabic>"),
            "<div class=\"olist arabic\"> <ol>\n</ol> </div>\n"
        );
    }

    #[test]
    fn test_top_anchor() {
        assert_eq!(render("<top />"), "<div id=\"top\"> </div>\n");
    }

    #[test]
    fn test_section_types() {
        assert_eq!(
            render("<section type=\"1\"></section>"),
            "<section class=\"sect1\">\n</section>\n"
        );
        assert_eq!(
            render("<section type=\"body\" id=\"s\"></section>"),
            "<section id=\"s\" class=\"sectionbody\">\n</section>\n"
        );
        assert_eq!(render("<section></section>"), "<section>\n</section>\n");
    }

    #[test]
    fn test_nested_accordions_close_in_order() {
        assert_eq!(
            render(
                "<accordion type=\"unordered\"><accordion type=\"ordered\">\
                 </accordion></accordion>"
            ),
            "<ul class=\"accordion\">\n<ol class=\"accordion\">\n</ol>\n</ul>\n"
        );
    }

    #[test]
    fn test_nav_and_sub_nav() {
        assert_eq!(
            render("<nav class=\"top-bar\"><nav sub></nav></nav>"),
            "<nav class=\"top-bar\">\n<ul class=\"sub-nav\">\n</ul>\n</nav>\n"
        );
    }

    #[test]
    fn test_navlink() {
        assert_eq!(
            render("<navlink href=\"/docs\" id=\"d\" new-tab>Docs</navlink>"),
            "<li class=\"\" id=\"d\"><a href=\"/docs\" target=\"_blank\">\nDocs\n</a></li>\n"
        );
    }

    #[test]
    fn test_menu_toggle() {
        assert_eq!(
            render("<menu-toggle />"),
            "<li class=\"toggle-topbar menu-icon\"><a href=\"#\"><span>Menu</span></a></li>\n"
        );
    }

    #[test]
    fn test_anchor_new_tab() {
        assert_eq!(
            render("<a href=\"/x\" new-tab>x</a>"),
            "<a href=\"/x\" target=\"_blank\">\nx\n</a>\n"
        );
        assert_eq!(
            render("<pdf-link href=\"/doc.pdf\">PDF</pdf-link>"),
            "<a href=\"/doc.pdf\" class=\"pdf\">\nPDF\n</a>\n"
        );
    }

    #[test]
    fn test_set_then_substitute() {
        let mut context = Context::new();
        let out = render_with(
            "<set title=\"Docs\" heading=\"{{ title }} page\" /><h1>{{heading}}</h1>",
            &mut context,
        );
        assert_eq!(out, "<h1>\nDocs page\n</h1>\n");
        assert_eq!(context.value("title"), "Docs");
    }

    #[test]
    fn test_code_capture_drops_leading_blank_line() {
        let mut context = Context::from_pairs([("lang", "rust")]);
        let out = render_with(
            "<pre class=\"{{lang}}\">\n  let x = 1;\n  {{lang}} &amp; more\n</pre>",
            &mut context,
        );
        assert_eq!(
            out,
            "<pre class=\"rust\">  let x = 1;\n  rust &amp; more\n</pre>\n"
        );
    }

    #[test]
    fn test_code_capture_keeps_nested_markup() {
        assert_eq!(
            render("<pre><code>fn main() {}</code></pre>"),
            "<pre><code>fn main() {}</code></pre>\n"
        );
    }

    #[test]
    fn test_code_capture_substitutes_tag_fragments_once() {
        let pairs = [("x.y", "Z"), ("a", "{{x.y}}")];
        assert_eq!(
            render_with("<span title=\"{{a}}\"></span>", &mut Context::from_pairs(pairs)),
            "<span title=\"{{x.y}}\">\n</span>\n"
        );
        assert_eq!(
            render_with(
                "<pre><span title=\"{{a}}\"></span></pre>",
                &mut Context::from_pairs(pairs)
            ),
            "<pre><span title=\"{{x.y}}\"></span></pre>\n"
        );
    }

    #[test]
    fn test_charref_placeholder_expands() {
        assert_eq!(render("<p>{&copy&} 2024</p>"), "<p>\n&copy; 2024\n</p>\n");
    }

    #[test]
    fn test_include_requires_src() {
        assert!(matches!(
            render_err("<include />"),
            RenderError::MissingAttribute { .. }
        ));
    }

    #[test]
    fn test_unbalanced_end_tags_are_errors() {
        assert!(matches!(
            render_err("</accordion>"),
            RenderError::StackUnderflow(FrameKind::Accordion)
        ));
        assert!(matches!(
            render_err("</section>"),
            RenderError::StackUnderflow(FrameKind::Section)
        ));
        assert!(matches!(
            render_err("</code>"),
            RenderError::StackUnderflow(FrameKind::CodeCapture)
        ));
    }
}
