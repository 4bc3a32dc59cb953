//! The in-memory passage corpus.
//!
//! Holds the reference passages behind the retriever and serves direct
//! lookups for the `/rag/content/{id}` and `/rag/chapters` endpoints.
//! Insertion order is significant: retrievers tie-break equal scores by it.

use pedsgate_core::Passage;

/// An ordered, immutable store of reference passages.
#[derive(Debug, Clone)]
pub struct Corpus {
    passages: Vec<Passage>,
}

impl Corpus {
    /// Create a corpus from an ordered passage list.
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    /// Create an empty corpus.
    pub fn empty() -> Self {
        Self {
            passages: Vec::new(),
        }
    }

    /// The built-in sample corpus: five passages from the Nelson Textbook
    /// of Pediatrics used until a full content ingestion pipeline exists.
    pub fn builtin() -> Self {
        Self::new(vec![
            passage(
                "1",
                "Neonatal Jaundice",
                102,
                "Neonatal jaundice is a common condition affecting approximately 60% of term \
                 newborns and 80% of preterm infants. It results from elevated bilirubin levels \
                 in the blood. Physiologic jaundice typically appears after 24 hours of life, \
                 peaks at 3-5 days, and resolves by 1-2 weeks in term infants. Pathologic \
                 jaundice appears within the first 24 hours, has a rapid rise in bilirubin \
                 levels, or persists beyond normal timeframes. Treatment includes phototherapy \
                 for moderate hyperbilirubinemia and exchange transfusion for severe cases. Risk \
                 factors include prematurity, breastfeeding difficulties, ABO incompatibility, \
                 and glucose-6-phosphate dehydrogenase deficiency.",
            ),
            passage(
                "2",
                "Pediatric Fever Management",
                156,
                "Fever in children is defined as a rectal temperature \u{2265}38\u{b0}C \
                 (100.4\u{b0}F). It is a common presenting symptom in pediatric practice and \
                 represents the body's natural response to infection or inflammation. Management \
                 depends on the child's age, appearance, and underlying conditions. In infants \
                 <3 months, fever requires immediate medical evaluation due to risk of serious \
                 bacterial infection. Antipyretic therapy with acetaminophen or ibuprofen can be \
                 used for comfort but is not mandatory unless the child appears distressed. The \
                 focus should be on identifying and treating the underlying cause rather than \
                 the fever itself.",
            ),
            passage(
                "3",
                "Pediatric Growth and Development",
                45,
                "Normal growth and development in children follows predictable patterns but with \
                 individual variation. Growth charts are essential tools for monitoring \
                 progress. Key milestones include: motor development (sitting at 6 months, \
                 walking at 12-15 months), language development (first words at 12 months, \
                 2-word phrases at 24 months), and social development (social smile at 2 months, \
                 stranger anxiety at 8-9 months). Red flags for developmental delay include loss \
                 of previously acquired skills, significant delays in multiple domains, or \
                 parental concerns. Early intervention services can significantly improve \
                 outcomes for children with developmental delays.",
            ),
            passage(
                "4",
                "Pediatric Respiratory Infections",
                234,
                "Respiratory tract infections are among the most common illnesses in children. \
                 Upper respiratory infections (URIs) including the common cold are typically \
                 viral and self-limiting. Lower respiratory tract infections such as pneumonia \
                 and bronchiolitis require more careful evaluation. Bronchiolitis, commonly \
                 caused by RSV, affects infants and young children, presenting with wheezing, \
                 cough, and respiratory distress. Treatment is supportive with oxygen and \
                 hydration as needed. Pneumonia may be viral or bacterial; bacterial pneumonia \
                 often requires antibiotic therapy. Warning signs include high fever, \
                 significant respiratory distress, poor feeding, and lethargy.",
            ),
            passage(
                "5",
                "Pediatric Nutrition and Feeding",
                78,
                "Proper nutrition is crucial for optimal growth and development in children. \
                 Breastfeeding is recommended as the exclusive source of nutrition for the first \
                 6 months of life. Introduction of solid foods should begin around 6 months with \
                 iron-rich foods. Common feeding problems include food allergies, failure to \
                 thrive, and feeding aversion. Nutritional requirements vary by age, with \
                 infants requiring higher caloric density per kilogram than older children. \
                 Vitamin D supplementation is recommended for breastfed infants. Iron deficiency \
                 anemia is common in toddlers and can be prevented with iron-rich foods and \
                 appropriate screening.",
            ),
        ])
    }

    /// Look up a passage by its identifier.
    pub fn get(&self, id: &str) -> Option<&Passage> {
        self.passages.iter().find(|p| p.id == id)
    }

    /// All passages, in insertion order.
    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Unique chapter labels, sorted alphabetically.
    pub fn chapters(&self) -> Vec<String> {
        let mut chapters: Vec<String> = self.passages.iter().map(|p| p.chapter.clone()).collect();
        chapters.sort();
        chapters.dedup();
        chapters
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

fn passage(id: &str, chapter: &str, page_number: u32, content: &str) -> Passage {
    Passage {
        id: id.into(),
        chapter: chapter.into(),
        page_number,
        content: content.into(),
        relevance_score: 0.0,
    }
}
