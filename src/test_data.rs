#[cfg(test)]
pub const POST_MARKDOWN: &str = "# What I learned after 20+ years of software development
How to be a great software engineer?

Someone asked me this question today and I did not have an answer. After thinking for a while, I came up with a list of what I try to do myself.

## Non technical

### Have a honest image of yourself

You finished university and learned a lot. You solved many hard problems.
Some day in your life, you will find that you are not. __The earlier you find that, the better.__
";

#[cfg(test)]
pub const LEGACY_META_JSON: &str = r#"{
  "createdAt": "2014-01-21T10:00:00Z",
  "tags": ["b", "a"],
  "title": "First Post"
}"#;

#[cfg(test)]
pub const LEGACY_MARKDOWN: &str = "# First Post

Hello from the old blog.
";
