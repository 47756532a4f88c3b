//! CID 7469: Generic Intensity and Size Measurements.

use super::context_group;

context_group! {
    /// CID 7469: Generic Intensity and Size Measurements.
    pub type Cid7469GenericIntensityAndSizeMeasurements = ContextGroup<IntensityAndSizeMeasurement> {
        identifier: "7469",
        version: "20141110",
        uid: "1.2.840.10008.6.1.1003",
        extensible: true,
        codes: {
            ApparentDiffusionCoefficient => ("113041", "DCM", "Apparent Diffusion Coefficient"),
            FractionalAnisotropy => ("110808", "DCM", "Fractional Anisotropy"),
            T1 => ("113063", "DCM", "T1"),
            T2 => ("113065", "DCM", "T2"),
            AttenuationCoefficient => ("112031", "DCM", "Attenuation Coefficient"),
            StandardizedUptakeValue => ("126400", "DCM", "Standardized Uptake Value"),
            SUVbw => ("126401", "DCM", "SUVbw"),
            SUVlbm => ("126402", "DCM", "SUVlbm"),
            SUVbsa => ("126403", "DCM", "SUVbsa"),
            Length => ("G-D7FE", "SRT", "Length"),
            Diameter => ("M-02550", "SRT", "Diameter"),
            LongAxis => ("G-A185", "SRT", "Long Axis"),
            ShortAxis => ("G-A186", "SRT", "Short Axis"),
            MajorAxis => ("G-A193", "SRT", "Major Axis"),
            MinorAxis => ("G-A194", "SRT", "Minor Axis"),
            Perimeter => ("G-A197", "SRT", "Perimeter"),
            Area => ("G-A166", "SRT", "Area"),
            Volume => ("G-D705", "SRT", "Volume"),
            VolumeOfMesh => ("RNU0", "IBSI", "Volume of Mesh"),
            VolumeFromVoxelSummation => ("YEKZ", "IBSI", "Volume from Voxel Summation"),
        }
    }
}
