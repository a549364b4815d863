//! Built-in HUM人N story

use super::catalog::SectionCatalog;
use super::section::Section;
use crate::Result;
use humn_common::config::StoryConfig;

const CTA_CONTENT_JOIN: &str = "Are you feeling ready to rediscover your essence and help me shape a future that's all about being human?";
const CTA_CONTENT_FINAL: &str = "Ready to join me in creating a community focused on human flourishing in this AI era?";
const CTA_TEXTS: [&str; 4] = ["Join HUM人N", "Find Purpose", "Build Community", "Shape the Future"];

const AWAKENING_BODY: &str = "Can you believe it? You're here, alive, a living miracle.

There is so much that's changing in the world right now, and it's a bit unsettling.

But I believe it's the perfect time to reconnect with what makes us human.

***This is an invitation to walk with me on a journey to find your divine purpose, and connect you with others who are already on this amazing path.***";

const ESSENCE: &str = "Remember, your worth isn't measured by what you do but by who you are.

AI might get really good at tasks, but it'll never capture the essence of you - your ability to connect, create, and grow spiritually. This isn't just another era; it's your golden age waiting to unfold.

***I want to help you dive back into what makes you uniquely, beautifully human.***";

const COMMUNITY: &str = "HUM人N isn't just another community; it's a movement I started with a vision.

I believe technology should enrich our humanity, not overshadow it. Here, you'll learn that true joy comes from connecting with your core, supporting each other through change, and building a future where humanity thrives.";

const OFFERINGS: &str = "In our community, you'll find:

- Ways to explore who you truly are and what you're meant to do
- Support for your personal growth journey
- Genuine connections with people who get it
- Events where you can feel that human connection
- Tools to not just survive, but thrive with AI

***I'll walk this path with you as you find your divine purpose.***";

const FUTURE: &str = "With AI evolving, our need for real human connections and spiritual growth is more important than ever.

I've created HUM人N to help you:
- Discover your unique purpose
- Build lasting relationships
- Grow and transform together
- Shape a future that honors our humanity

***The future's coming fast. Let me help you embrace it as the most human you can be.***

— Johnny";

/// Who is reading the story
#[derive(Debug, Clone, Default)]
pub struct StoryAudience {
    /// Name captured from an invite link
    pub visitor_name: Option<String>,
    /// Name of the signed-in member; members never see calls-to-action
    pub member_name: Option<String>,
}

impl StoryAudience {
    pub fn is_member(&self) -> bool {
        self.member_name.is_some()
    }
}

/// Options for building the story catalog
#[derive(Debug, Clone)]
pub struct StoryOptions {
    /// Prefix for narration audio paths (may be empty)
    pub audio_base_url: String,
    /// Call-to-action destination
    pub show_interest_url: String,
    pub audience: StoryAudience,
}

impl StoryOptions {
    pub fn from_config(config: &StoryConfig, audience: StoryAudience) -> Self {
        Self {
            audio_base_url: config.audio_base_url.clone(),
            show_interest_url: config.show_interest_url.clone(),
            audience,
        }
    }
}

/// Opening line of the story.
///
/// Uses the member's first name, else the visitor's, else a generic line.
pub fn greeting(visitor_name: Option<&str>, member_name: Option<&str>) -> String {
    let first_name = |name: &str| name.split_whitespace().next().map(str::to_string);

    if let Some(name) = member_name.and_then(first_name) {
        return format!("Hey {}, it's Johnny, and I'm so glad you're here.", name);
    }
    match visitor_name.and_then(first_name) {
        Some(name) => format!(
            "Hey {}, it's Johnny, and it was an honor to have met you just now.",
            name
        ),
        None => "Hey there, it's Johnny, and it was an honor to have met you just now.".to_string(),
    }
}

fn audio_ref(base: &str, id: &str) -> Option<String> {
    Some(format!("{}/story/{}.mp3", base.trim_end_matches('/'), id))
}

fn cta(id: &str, content: &str, link: &str) -> Section {
    Section::call_to_action(
        id,
        content,
        link,
        CTA_TEXTS.iter().map(|t| t.to_string()).collect(),
    )
}

/// Build the HUM人N story for an audience
pub fn hum_story(options: &StoryOptions) -> Result<SectionCatalog> {
    let base = options.audio_base_url.as_str();
    let link = options.show_interest_url.as_str();
    let opening = greeting(
        options.audience.visitor_name.as_deref(),
        options.audience.member_name.as_deref(),
    );

    let catalog = SectionCatalog::new(vec![
        Section::narration(
            "awakening",
            "The Great Awakening",
            format!("{}\n\n{}", opening, AWAKENING_BODY),
            audio_ref(base, "awakening"),
        ),
        Section::narration("essence", "Divine Essence", ESSENCE, audio_ref(base, "essence")),
        Section::narration(
            "community",
            "The HUM人N Movement",
            COMMUNITY,
            audio_ref(base, "community"),
        ),
        cta("join-cta", CTA_CONTENT_JOIN, link),
        Section::narration("offerings", "What We Offer", OFFERINGS, audio_ref(base, "offerings")),
        Section::narration("future", "The Path Forward", FUTURE, audio_ref(base, "future")),
        cta("final-cta", CTA_CONTENT_FINAL, link),
    ])?;

    if options.audience.is_member() {
        Ok(catalog.without_calls_to_action())
    } else {
        Ok(catalog)
    }
}
