use core::fmt::Write;

use pixelift_checkout::ACCEPTED_MIME_TYPES;
use pixelift_jobs::Resolution;

use crate::attributes::BlockAttributes;
use crate::collaborators::{Escape, OptionsStore, Translate, TERMS_URL_OPTION};

/// Renders the uploader block and its embedded purchase modal.
///
/// Collaborators arrive by reference at construction; the renderer itself
/// holds no configuration and no mutable state, so one instance can serve
/// concurrent requests.
pub struct BlockRenderer<'a> {
    translator: &'a dyn Translate,
    escape: &'a dyn Escape,
    options: &'a dyn OptionsStore,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(
        translator: &'a dyn Translate,
        escape: &'a dyn Escape,
        options: &'a dyn OptionsStore,
    ) -> Self {
        Self {
            translator,
            escape,
            options,
        }
    }

    /// Translated then HTML-escaped label text.
    fn label(&self, text: &str) -> String {
        self.escape.html(&self.translator.translate(text))
    }

    /// The stable markup contract for the uploader block.
    ///
    /// Client logic binds to the `data-role` hooks; panels that belong to
    /// later flow stages render hidden, and the checkout button renders
    /// disabled until the client enables it.
    pub fn render_uploader(&self, attrs: &BlockAttributes) -> String {
        let mut html = String::new();

        let _ = write!(
            html,
            "<div class=\"pixelift-uploader\" data-role=\"uploader\" data-max-file-size-mb=\"{}\">\n",
            attrs.max_file_size_mb
        );
        let _ = write!(
            html,
            "  <h3 class=\"pixelift-title\">{}</h3>\n",
            self.escape.html(&attrs.title)
        );
        let _ = write!(
            html,
            "  <p class=\"pixelift-description\">{}</p>\n",
            self.escape.html(&attrs.description)
        );

        html.push_str("  <div class=\"pixelift-upload-zone\" data-role=\"upload-zone\">\n");
        html.push_str("    <div class=\"pixelift-dropzone\" data-role=\"dropzone\">\n");
        let _ = write!(
            html,
            "      <p>{}</p>\n",
            self.label("Drag an image here, or")
        );
        let _ = write!(
            html,
            "      <button type=\"button\" data-role=\"browse\">{}</button>\n",
            self.label("Browse files")
        );
        let _ = write!(
            html,
            "      <input type=\"file\" data-role=\"file-input\" accept=\"{}\" hidden>\n",
            self.escape.attr(&ACCEPTED_MIME_TYPES.join(","))
        );
        let _ = write!(
            html,
            "      <p class=\"pixelift-limit\">{}: {} MB</p>\n",
            self.label("Maximum file size"),
            attrs.max_file_size_mb
        );
        html.push_str("    </div>\n");
        html.push_str("    <div class=\"pixelift-preview\" data-role=\"preview\" hidden>\n");
        let _ = write!(
            html,
            "      <img data-role=\"preview-image\" alt=\"{}\">\n",
            self.escape.attr(&self.translator.translate("Selected image preview"))
        );
        let _ = write!(
            html,
            "      <button type=\"button\" data-role=\"remove\">{}</button>\n",
            self.label("Remove image")
        );
        html.push_str("    </div>\n");
        html.push_str("  </div>\n");

        html.push_str(
            "  <fieldset class=\"pixelift-resolution\" data-role=\"resolution-picker\" hidden>\n",
        );
        let _ = write!(html, "    <legend>{}</legend>\n", self.label("Resolution"));
        for tier in Resolution::all() {
            let checked = if tier == Resolution::default() {
                " checked"
            } else {
                ""
            };
            let _ = write!(
                html,
                "    <label><input type=\"radio\" name=\"pixelift-resolution\" value=\"{tier}\"{checked}> {tier}</label>\n"
            );
        }
        html.push_str("    <p class=\"pixelift-price\" data-role=\"price\"></p>\n");
        html.push_str("  </fieldset>\n");

        html.push_str("  <div class=\"pixelift-email\" data-role=\"email-entry\" hidden>\n");
        let _ = write!(
            html,
            "    <label for=\"pixelift-email-input\">{}</label>\n",
            self.label("Email address")
        );
        html.push_str(
            "    <input type=\"email\" id=\"pixelift-email-input\" data-role=\"email-input\" autocomplete=\"email\">\n",
        );
        html.push_str("  </div>\n");

        let _ = write!(
            html,
            "  <button type=\"button\" class=\"pixelift-checkout\" data-role=\"checkout\" disabled>{}</button>\n",
            self.label("Buy now")
        );

        html.push_str("  <div class=\"pixelift-loading\" data-role=\"loading\" hidden>\n");
        html.push_str("    <span class=\"pixelift-spinner\" aria-hidden=\"true\"></span>\n");
        let _ = write!(
            html,
            "    <span data-role=\"loading-text\">{}</span>\n",
            self.label("Processing your order…")
        );
        html.push_str("  </div>\n");

        html.push_str(
            "  <div class=\"pixelift-error\" data-role=\"error\" role=\"alert\" hidden></div>\n",
        );

        if attrs.show_terms_link {
            if let Some(url) = self
                .options
                .get(TERMS_URL_OPTION)
                .filter(|u| !u.trim().is_empty())
            {
                let _ = write!(
                    html,
                    "  <p class=\"pixelift-terms\"><a data-role=\"terms\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></p>\n",
                    self.escape.url(&url),
                    self.label("Terms & Conditions")
                );
            }
        }

        html.push_str("</div>\n");
        html
    }
}
