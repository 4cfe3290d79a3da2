use serde::Serialize;

use crate::models::{Language, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestedPrompt {
    pub label: &'static str,
    pub text: &'static str,
}

/// A titled group of sample queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleQueryCategory {
    pub category: &'static str,
    pub queries: [&'static str; 3],
}

const fn prompt(label: &'static str, text: &'static str) -> SuggestedPrompt {
    SuggestedPrompt { label, text }
}

const fn category(category: &'static str, queries: [&'static str; 3]) -> SampleQueryCategory {
    SampleQueryCategory { category, queries }
}

const INSTRUCTOR_PROMPTS_EN: [SuggestedPrompt; 3] = [
    prompt("Course Planning", "How do I prepare for my first MHFA class?"),
    prompt(
        "Instructor Renewal",
        "How do I renew my instructor certification?",
    ),
    prompt(
        "Teaching Resources",
        "Where can I find instructor resources and materials?",
    ),
];

const INSTRUCTOR_PROMPTS_ES: [SuggestedPrompt; 3] = [
    prompt(
        "Planificación de Cursos",
        "¿Cómo me preparo para mi primera clase de MHFA?",
    ),
    prompt(
        "Renovación de Instructor",
        "¿Cómo renuevo mi certificación de instructor?",
    ),
    prompt(
        "Recursos de Enseñanza",
        "¿Dónde puedo encontrar recursos y materiales para instructores?",
    ),
];

const STAFF_PROMPTS_EN: [SuggestedPrompt; 3] = [
    prompt(
        "Program Management",
        "How do I schedule and coordinate MHFA training sessions?",
    ),
    prompt("Instructor Support", "How do I onboard new MHFA instructors?"),
    prompt(
        "Analytics & Reports",
        "Show me training program metrics and analytics",
    ),
];

const STAFF_PROMPTS_ES: [SuggestedPrompt; 3] = [
    prompt(
        "Gestión de Programas",
        "¿Cómo programo y coordino sesiones de capacitación de MHFA?",
    ),
    prompt(
        "Apoyo a Instructores",
        "¿Cómo incorporo nuevos instructores de MHFA?",
    ),
    prompt(
        "Análisis e Informes",
        "Muéstrame métricas y análisis del programa de capacitación",
    ),
];

const LEARNER_PROMPTS_EN: [SuggestedPrompt; 3] = [
    prompt("Course Registration", "How do I register for an MHFA course?"),
    prompt(
        "Certification",
        "How do I get certified in Mental Health First Aid?",
    ),
    prompt("ALGEE Action Plan", "What is the ALGEE action plan?"),
];

const LEARNER_PROMPTS_ES: [SuggestedPrompt; 3] = [
    prompt(
        "Registro de Curso",
        "¿Cómo me registro para un curso de MHFA?",
    ),
    prompt(
        "Certificación",
        "¿Cómo me certifico en Primeros Auxilios en Salud Mental?",
    ),
    prompt("Plan de Acción ALGEE", "¿Qué es el plan de acción ALGEE?"),
];

const INSTRUCTOR_QUERIES_EN: [SampleQueryCategory; 3] = [
    category(
        "Teaching & Training",
        [
            "How do I prepare for my first MHFA class?",
            "What are best practices for teaching MHFA courses?",
            "How can I engage participants in online MHFA training?",
        ],
    ),
    category(
        "Certification & Requirements",
        [
            "How do I renew my instructor certification?",
            "What continuing education is required for instructors?",
            "How can I maintain my instructor status?",
        ],
    ),
    category(
        "Resources & Support",
        [
            "Where can I find instructor resources and materials?",
            "How do I access the instructor portal?",
            "What support is available for instructors?",
        ],
    ),
];

const INSTRUCTOR_QUERIES_ES: [SampleQueryCategory; 3] = [
    category(
        "Enseñanza y Capacitación",
        [
            "¿Cómo me preparo para mi primera clase de MHFA?",
            "¿Cuáles son las mejores prácticas para enseñar cursos de MHFA?",
            "¿Cómo puedo involucrar a los participantes en la capacitación en línea de MHFA?",
        ],
    ),
    category(
        "Certificación y Requisitos",
        [
            "¿Cómo renuevo mi certificación de instructor?",
            "¿Qué educación continua se requiere para los instructores?",
            "¿Cómo puedo mantener mi estado de instructor?",
        ],
    ),
    category(
        "Recursos y Apoyo",
        [
            "¿Dónde puedo encontrar recursos y materiales para instructores?",
            "¿Cómo accedo al portal de instructores?",
            "¿Qué apoyo está disponible para los instructores?",
        ],
    ),
];

const STAFF_QUERIES_EN: [SampleQueryCategory; 3] = [
    category(
        "Implementation",
        [
            "How can we implement MHFA training in our organization?",
            "What are the costs and logistics of hosting MHFA courses?",
            "How do we schedule and coordinate MHFA training sessions?",
        ],
    ),
    category(
        "Program Management",
        [
            "How do we track employee MHFA certifications?",
            "What metrics should we use to measure program success?",
            "How can we encourage staff participation in MHFA training?",
        ],
    ),
    category(
        "Resources",
        [
            "What materials do we need to support MHFA training?",
            "How can we promote MHFA within our organization?",
            "Where can I find case studies of successful implementations?",
        ],
    ),
];

const STAFF_QUERIES_ES: [SampleQueryCategory; 3] = [
    category(
        "Implementación",
        [
            "¿Cómo podemos implementar la capacitación de MHFA en nuestra organización?",
            "¿Cuáles son los costos y la logística de organizar cursos de MHFA?",
            "¿Cómo programamos y coordinamos sesiones de capacitación de MHFA?",
        ],
    ),
    category(
        "Gestión del Programa",
        [
            "¿Cómo rastreamos las certificaciones MHFA de los empleados?",
            "¿Qué métricas debemos usar para medir el éxito del programa?",
            "¿Cómo podemos fomentar la participación del personal en la capacitación de MHFA?",
        ],
    ),
    category(
        "Recursos",
        [
            "¿Qué materiales necesitamos para apoyar la capacitación de MHFA?",
            "¿Cómo podemos promover MHFA dentro de nuestra organización?",
            "¿Dónde puedo encontrar estudios de casos de implementaciones exitosas?",
        ],
    ),
];

const LEARNER_QUERIES_EN: [SampleQueryCategory; 3] = [
    category(
        "Getting Started",
        [
            "What is Mental Health First Aid and how does it work?",
            "How do I sign up for an MHFA course?",
            "What should I expect in an MHFA training?",
        ],
    ),
    category(
        "Certification",
        [
            "How long does MHFA certification last?",
            "What are the requirements to get certified?",
            "How do I recertify after my certification expires?",
        ],
    ),
    category(
        "Application",
        [
            "How can I use MHFA skills in my daily life?",
            "What do I do if someone is having a mental health crisis?",
            "Where can I find additional resources to support my learning?",
        ],
    ),
];

const LEARNER_QUERIES_ES: [SampleQueryCategory; 3] = [
    category(
        "Comenzando",
        [
            "¿Qué es Primeros Auxilios en Salud Mental y cómo funciona?",
            "¿Cómo me inscribo en un curso de MHFA?",
            "¿Qué debo esperar en una capacitación de MHFA?",
        ],
    ),
    category(
        "Certificación",
        [
            "¿Cuánto tiempo dura la certificación de MHFA?",
            "¿Cuáles son los requisitos para obtener la certificación?",
            "¿Cómo me recertifico después de que expire mi certificación?",
        ],
    ),
    category(
        "Aplicación",
        [
            "¿Cómo puedo usar las habilidades de MHFA en mi vida diaria?",
            "¿Qué hago si alguien tiene una crisis de salud mental?",
            "¿Dónde puedo encontrar recursos adicionales para apoyar mi aprendizaje?",
        ],
    ),
];

pub fn suggested_prompts(role: UserRole, language: Language) -> &'static [SuggestedPrompt] {
    match (role, language) {
        (UserRole::Instructor, Language::En) => &INSTRUCTOR_PROMPTS_EN,
        (UserRole::Instructor, Language::Es) => &INSTRUCTOR_PROMPTS_ES,
        (UserRole::Staff, Language::En) => &STAFF_PROMPTS_EN,
        (UserRole::Staff, Language::Es) => &STAFF_PROMPTS_ES,
        (UserRole::Learner, Language::En) => &LEARNER_PROMPTS_EN,
        (UserRole::Learner, Language::Es) => &LEARNER_PROMPTS_ES,
    }
}

/// Looks up a prompt by its 1-based position in the role's list.
pub fn prompt_by_index(
    role: UserRole,
    language: Language,
    index: usize,
) -> Option<&'static SuggestedPrompt> {
    index
        .checked_sub(1)
        .and_then(|i| suggested_prompts(role, language).get(i))
}

pub fn sample_queries(role: UserRole, language: Language) -> &'static [SampleQueryCategory] {
    match (role, language) {
        (UserRole::Instructor, Language::En) => &INSTRUCTOR_QUERIES_EN,
        (UserRole::Instructor, Language::Es) => &INSTRUCTOR_QUERIES_ES,
        (UserRole::Staff, Language::En) => &STAFF_QUERIES_EN,
        (UserRole::Staff, Language::Es) => &STAFF_QUERIES_ES,
        (UserRole::Learner, Language::En) => &LEARNER_QUERIES_EN,
        (UserRole::Learner, Language::Es) => &LEARNER_QUERIES_ES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANGUAGES: [Language; 2] = [Language::En, Language::Es];

    #[test]
    fn test_every_role_has_prompts() {
        for role in UserRole::all() {
            for language in LANGUAGES {
                let prompts = suggested_prompts(role, language);
                assert_eq!(prompts.len(), 3);
                assert!(prompts.iter().all(|p| !p.text.trim().is_empty()));
            }
        }
    }

    #[test]
    fn test_role_specific() {
        assert_eq!(
            suggested_prompts(UserRole::Learner, Language::En)[2].text,
            "What is the ALGEE action plan?"
        );
        assert_eq!(
            suggested_prompts(UserRole::Staff, Language::En)[0].label,
            "Program Management"
        );
    }

    #[test]
    fn test_spanish_prompts() {
        assert_eq!(
            suggested_prompts(UserRole::Learner, Language::Es)[2].text,
            "¿Qué es el plan de acción ALGEE?"
        );
        assert_eq!(
            prompt_by_index(UserRole::Instructor, Language::Es, 1).map(|p| p.label),
            Some("Planificación de Cursos")
        );
    }

    #[test]
    fn test_prompt_by_index() {
        assert_eq!(
            prompt_by_index(UserRole::Instructor, Language::En, 1).map(|p| p.label),
            Some("Course Planning")
        );
        assert!(prompt_by_index(UserRole::Instructor, Language::En, 0).is_none());
        assert!(prompt_by_index(UserRole::Instructor, Language::En, 4).is_none());
    }

    #[test]
    fn test_sample_queries_shape() {
        for role in UserRole::all() {
            for language in LANGUAGES {
                let categories = sample_queries(role, language);
                assert_eq!(categories.len(), 3);
                assert!(categories
                    .iter()
                    .flat_map(|c| c.queries.iter())
                    .all(|q| !q.trim().is_empty()));
            }
        }
    }

    #[test]
    fn test_sample_queries_are_localized() {
        let en = sample_queries(UserRole::Staff, Language::En);
        let es = sample_queries(UserRole::Staff, Language::Es);
        assert_eq!(en[0].category, "Implementation");
        assert_eq!(es[0].category, "Implementación");
        assert_ne!(en[1].queries[0], es[1].queries[0]);
        assert!(es.iter().flat_map(|c| c.queries.iter()).all(|q| q.starts_with('¿')));
    }
}
