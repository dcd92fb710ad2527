//! User-facing copy, one table per language.
//!
//! Templates marked HTML are sent with `parse_mode = HTML`; every value spliced into
//! them goes through [`escape_html`] first. `{channel}` and `{topic}` are the only
//! placeholders.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Es,
}

impl Locale {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Locale::En),
            "es" | "spanish" | "español" => Some(Locale::Es),
            _ => None,
        }
    }

    pub fn catalog(self) -> &'static Catalog {
        match self {
            Locale::En => &EN,
            Locale::Es => &ES,
        }
    }
}

pub struct Catalog {
    pub verify_button: &'static str,
    /// HTML. Used when membership is verified.
    pub welcome_gated: &'static str,
    /// HTML. Used when every click gets the guide.
    pub welcome_open: &'static str,
    pub default_topic: &'static str,
    pub checking: &'static str,
    pub thanks: &'static str,
    /// HTML, followed by the escaped link.
    pub link_intro: &'static str,
    pub unavailable: &'static str,
    pub delivery_failed: &'static str,
    /// HTML.
    pub not_subscribed: &'static str,
    pub check_failed: &'static str,
    pub unknown_action: &'static str,
    pub admin_only: &'static str,
    pub file_updated: &'static str,
    pub link_updated: &'static str,
    pub not_a_pdf: &'static str,
    pub invalid_link: &'static str,
    pub usage: &'static str,
    pub save_failed: &'static str,
    pub unexpected_error: &'static str,
}

static EN: Catalog = Catalog {
    verify_button: "✅ Verify Subscription & Get Guide",
    welcome_gated: "Hello! 👋 This bot provides the <b>{topic}</b>, exclusively for subscribers of <b>{channel}</b>.\n\n\
        ➡️ Click the button below to verify your subscription and get the guide.\n\n\
        <i>If you haven't subscribed yet, please join <b>{channel}</b> first, then click the button.</i>",
    welcome_open: "Hello! 👋 This bot provides the <b>{topic}</b>.\n\n\
        ➡️ Click the button below to get the guide.",
    default_topic: "Guide",
    checking: "Checking subscription...",
    thanks: "Thanks for your interest! ✅",
    link_intro: "Here is the guide link you requested:\n",
    unavailable: "Sorry, the guide is currently unavailable. Please contact the administrator.",
    delivery_failed: "Sorry, there was an error sending the guide. Please contact the administrator.",
    not_subscribed: "❌ You are not subscribed to <b>{channel}</b> yet.\n\nPlease join the channel first, then click the button again.",
    check_failed: "⚠️ An internal error occurred while checking your subscription. Please contact the administrator.",
    unknown_action: "Unknown action.",
    admin_only: "❌ Sorry, this command is only available to bot administrators.",
    file_updated: "✅ Guide updated successfully. I will now send this PDF to verified subscribers.",
    link_updated: "✅ Guide link updated successfully. I will now send this link to verified subscribers.",
    not_a_pdf: "❌ Please reply to a PDF file message with /setguide.",
    invalid_link: "❌ Please provide a valid URL with /setguide <URL>.",
    usage: "Usage: Reply to a PDF message with /setguide or use /setguide <URL>.",
    save_failed: "❌ The guide could not be saved. The previous guide is still active; please check the bot logs.",
    unexpected_error: "An unexpected error occurred. Please try again later.",
};

static ES: Catalog = Catalog {
    verify_button: "✅ Verificar suscripción y obtener la guía",
    welcome_gated: "¡Hola! 👋 Este bot ofrece la <b>{topic}</b>, exclusiva para los suscriptores de <b>{channel}</b>.\n\n\
        ➡️ Pulsa el botón de abajo para verificar tu suscripción y recibir la guía.\n\n\
        <i>Si aún no te has suscrito, únete primero a <b>{channel}</b> y después pulsa el botón.</i>",
    welcome_open: "¡Hola! 👋 Este bot ofrece la <b>{topic}</b>.\n\n\
        ➡️ Pulsa el botón de abajo para recibir la guía.",
    default_topic: "Guía",
    checking: "Comprobando suscripción...",
    thanks: "¡Gracias por tu interés! ✅",
    link_intro: "Aquí tienes el enlace a la guía:\n",
    unavailable: "Lo sentimos, la guía no está disponible en este momento. Contacta con el administrador.",
    delivery_failed: "Lo sentimos, hubo un error al enviar la guía. Contacta con el administrador.",
    not_subscribed: "❌ Todavía no estás suscrito a <b>{channel}</b>.\n\nÚnete primero al canal y vuelve a pulsar el botón.",
    check_failed: "⚠️ Se produjo un error interno al comprobar tu suscripción. Contacta con el administrador.",
    unknown_action: "Acción desconocida.",
    admin_only: "❌ Lo sentimos, este comando solo está disponible para los administradores del bot.",
    file_updated: "✅ Guía actualizada. A partir de ahora enviaré este PDF a los suscriptores verificados.",
    link_updated: "✅ Enlace actualizado. A partir de ahora enviaré este enlace a los suscriptores verificados.",
    not_a_pdf: "❌ Responde a un mensaje con un archivo PDF usando /setguide.",
    invalid_link: "❌ Indica una URL válida con /setguide <URL>.",
    usage: "Uso: responde a un mensaje con un PDF usando /setguide o escribe /setguide <URL>.",
    save_failed: "❌ No se pudo guardar la guía. La guía anterior sigue activa; revisa los registros del bot.",
    unexpected_error: "Se produjo un error inesperado. Inténtalo de nuevo más tarde.",
};

impl Catalog {
    pub fn welcome(&self, topic: Option<&str>, channel: Option<&str>) -> String {
        let topic = match topic {
            Some(topic) => format!("{} {}", topic, self.default_topic),
            None => self.default_topic.to_string(),
        };
        let template = match channel {
            Some(_) => self.welcome_gated,
            None => self.welcome_open,
        };
        template
            .replace("{topic}", &escape_html(&topic))
            .replace("{channel}", &escape_html(channel.unwrap_or_default()))
    }

    pub fn denial(&self, channel: &str) -> String {
        self.not_subscribed.replace("{channel}", &escape_html(channel))
    }

    pub fn link(&self, link: &str) -> String {
        format!("{}{}", escape_html(self.link_intro), escape_html(link))
    }
}

/// Escapes the three characters Telegram's HTML parse mode interprets.
///
/// Markdown metacharacters such as `_` and `*` pass through untouched.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
