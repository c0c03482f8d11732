//! Interview script and instruction assembly.
//!
//! The language model receives one static instruction document built from
//! two inputs: a [`PersonaConfig`] (who the interviewer is and how they
//! behave) and an [`InterviewScript`] (the ordered question list). Assembly
//! is a pure function of those inputs; no I/O, no randomness, no failure
//! modes. The document is consumed verbatim by the session assembler.

/// The fixed interview questions, asked in listed order.
pub const INTERVIEW_QUESTIONS: [&str; 6] = [
    "Tell me about yourself and your professional background.",
    "Can you describe a challenging project you worked on and how you overcame the obstacles?",
    "How do you stay updated with the latest technologies in your field?",
    "Describe a time when you had to work with a difficult team member. How did you handle it?",
    "Where do you see yourself in the next 5 years?",
    "What interests you most about this position and our company?",
];

/// Ordered, immutable list of interview questions.
///
/// Created once at startup and never mutated; question order is significant
/// and carried through to the numbered list in the instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewScript {
    questions: Vec<String>,
}

impl Default for InterviewScript {
    fn default() -> Self {
        Self::new(INTERVIEW_QUESTIONS.iter().map(|q| (*q).to_owned()))
    }
}

impl InterviewScript {
    /// Create a script from an ordered question sequence.
    pub fn new(questions: impl IntoIterator<Item = String>) -> Self {
        Self {
            questions: questions.into_iter().collect(),
        }
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// True when the script has no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The questions, in asking order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Questions rendered as a numbered list (1-based, asking order).
    pub fn numbered(&self) -> Vec<String> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {q}", i + 1))
            .collect()
    }
}

/// Tone and behaviour directives for the interviewer persona.
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    /// First name the interviewer introduces themselves with.
    pub interviewer_name: String,
    /// Company the interview is conducted for.
    pub company: String,
    /// Verbatim opening the interviewer starts with.
    pub greeting: String,
    /// How to handle follow-ups while the candidate answers.
    pub follow_up_policy: String,
    /// Verbatim closing once all questions are done.
    pub closing: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            interviewer_name: "Sarah".into(),
            company: "Onboardly".into(),
            greeting: "Hello! Welcome to your interview with Onboardly. I'm Sarah, and I'll be \
                       conducting your interview today. This will be a conversational interview \
                       where I'll ask you several questions about your background and experience. \
                       Feel free to speak naturally - this is a friendly conversation. Let's begin!"
                .into(),
            follow_up_policy: "Listen carefully. Ask 1-2 brief follow-up questions when an answer \
                              is interesting, give encouraging feedback, then move to the next \
                              question."
                .into(),
            closing: "Thank you so much for your time today. You've shared some really \
                      interesting experiences. Our HR team will review your interview and be in \
                      touch with next steps soon. Best of luck!"
                .into(),
        }
    }
}

/// Assemble the instruction document the language model runs the interview
/// from.
///
/// Pure and deterministic: identical inputs yield byte-identical output.
/// Questions appear exactly once each, numbered 1..N in script order.
pub fn render_instructions(persona: &PersonaConfig, script: &InterviewScript) -> String {
    let questions = script.numbered().join("\n");

    format!(
        "You are {name}, an expert HR interviewer conducting a professional job interview \
         for {company}.\n\
         \n\
         YOUR PERSONALITY:\n\
         - Warm, professional, and encouraging\n\
         - Genuinely interested in the candidate\n\
         - Ask insightful follow-up questions when needed\n\
         - Provide positive reinforcement\n\
         - Make candidates feel comfortable\n\
         \n\
         GREETING (start with this):\n\
         \"{greeting}\"\n\
         \n\
         ASK THESE QUESTIONS IN ORDER:\n\
         {questions}\n\
         \n\
         DURING ANSWERS:\n\
         {follow_up}\n\
         \n\
         CLOSING:\n\
         \"{closing}\"\n\
         \n\
         RULES:\n\
         - Keep responses concise (2-3 sentences typically)\n\
         - Speak naturally, not robotically\n\
         - Do not repeat the candidate's entire answer back\n\
         - Be encouraging but professional\n\
         - Transition smoothly between questions\n\
         - If an answer is unclear, politely ask for clarification\n\
         \n\
         Remember: you are evaluating the candidate while representing {company} \
         positively!",
        name = persona.interviewer_name,
        company = persona.company,
        greeting = persona.greeting,
        questions = questions,
        follow_up = persona.follow_up_policy,
        closing = persona.closing,
    )
}
